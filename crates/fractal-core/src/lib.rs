//! Data-oriented fractal hierarchy and point-graph animators.
//!
//! The fractal is a flat, level-indexed 5-ary tree of parts whose world
//! transforms are propagated level by level each frame and packed into 3x4
//! matrices for instanced drawing. The graph modules animate a lattice of
//! points over a small library of parametric surfaces, either on the CPU or by
//! describing a compute dispatch for the GPU.

pub mod config;
pub mod error;
pub mod fractal;
pub mod graph;
pub mod math;
pub mod render;

pub use config::{FractalConfig, GraphConfig};
pub use error::{FractalError, Result};
pub use fractal::engine::Fractal;
pub use fractal::matrix::PackedMatrix;
pub use fractal::store::PartStore;
pub use render::{Bounds, RecordingRenderer, Renderer};

//! Fractal hierarchy stored as a flat, level-indexed 5-ary tree.
//!
//! `part` holds the per-part data and the five canonical child slots,
//! `store` owns the level arrays, `engine` propagates world transforms level
//! by level and `matrix` packs them for instanced drawing. `recursive` is the
//! per-node tree the flat layout replaces, kept as a reference model.

pub mod part;
pub mod store;
pub mod matrix;
pub mod engine;
pub mod recursive;

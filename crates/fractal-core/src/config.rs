use std::f32::consts::PI;

use crate::error::{FractalError, Result};
use crate::graph::functions::FunctionName;

pub const MIN_DEPTH: usize = 1;
pub const MAX_DEPTH: usize = 8;

/// Largest lattice the CPU graph animates.
pub const CPU_MAX_RESOLUTION: u32 = 100;
/// Largest lattice the GPU graph dispatches; its buffer is sized for this.
pub const GPU_MAX_RESOLUTION: u32 = 1000;

pub struct FractalConfig {
    /// Number of levels, root included.
    pub depth: usize,
    /// Spin speed in radians per second (22.5 degrees/s by default).
    pub angular_speed: f32,
    /// Minimum number of parts handed to one worker in the parallel update.
    pub batch_size: usize,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            depth: 4,
            angular_speed: 0.125 * PI,
            batch_size: 8,
        }
    }
}

impl FractalConfig {
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_depth(self.depth)
    }
}

pub fn validate_depth(depth: usize) -> Result<()> {
    if (MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
        Ok(())
    } else {
        Err(FractalError::InvalidDepth { depth })
    }
}

/// How the graph picks the next function when a transition starts.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TransitionMode {
    #[default]
    Cycle,
    Random,
}

pub struct GraphConfig {
    /// Points per lattice side; the graph holds `resolution^2` points.
    pub resolution: u32,
    pub function: FunctionName,
    /// Seconds a function is shown before a transition starts.
    pub function_duration: f32,
    /// Seconds a morph between two functions takes.
    pub transition_duration: f32,
    pub transition_mode: TransitionMode,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            resolution: 10,
            function: FunctionName::Wave,
            function_duration: 1.0,
            transition_duration: 1.0,
            transition_mode: TransitionMode::Cycle,
        }
    }
}

impl GraphConfig {
    pub fn validate(&self, max_resolution: u32) -> Result<()> {
        validate_resolution(self.resolution, max_resolution)
    }
}

pub fn validate_resolution(resolution: u32, max: u32) -> Result<()> {
    if resolution == 0 || resolution > max {
        Err(FractalError::InvalidResolution { resolution, max })
    } else {
        Ok(())
    }
}

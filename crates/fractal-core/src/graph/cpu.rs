use glam::Vec3;

use crate::config::{GraphConfig, TransitionMode, CPU_MAX_RESOLUTION};
use crate::error::Result;
use crate::graph::functions::{morph, FunctionName};
use crate::graph::schedule::FunctionSchedule;
use crate::graph::{lattice_coords, lattice_param, lattice_step};

/// Point graph evaluated on the CPU, one position per lattice point.
pub struct Graph {
    resolution: u32,
    step: f32,
    schedule: FunctionSchedule,
    positions: Vec<Vec3>,
}

impl Graph {
    pub fn new(config: &GraphConfig, seed: u32) -> Result<Self> {
        config.validate(CPU_MAX_RESOLUTION)?;
        let count = (config.resolution * config.resolution) as usize;
        Ok(Self {
            resolution: config.resolution,
            step: lattice_step(config.resolution),
            schedule: FunctionSchedule::new(config, seed),
            positions: vec![Vec3::ZERO; count],
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Uniform scale of every point: one lattice cell.
    pub fn point_scale(&self) -> f32 {
        self.step
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn schedule(&self) -> &FunctionSchedule {
        &self.schedule
    }

    pub fn set_function(&mut self, function: FunctionName) {
        self.schedule.set_function(function);
    }

    pub fn set_transition_mode(&mut self, mode: TransitionMode) {
        self.schedule.set_mode(mode);
    }

    /// Advance the schedule by `delta_time` and place every point at `time`.
    pub fn update(&mut self, delta_time: f32, time: f32) {
        self.schedule.advance(delta_time);

        let to = self.schedule.function();
        let from = self.schedule.transition_function();
        let transitioning = self.schedule.is_transitioning();
        let progress = self.schedule.progress();
        let resolution = self.resolution;
        let step = self.step;

        for (i, position) in self.positions.iter_mut().enumerate() {
            let (x, z) = lattice_coords(i, resolution);
            let u = lattice_param(x, step);
            let v = lattice_param(z, step);
            *position = if transitioning {
                morph(u, v, time, from, to, progress)
            } else {
                to.evaluate(u, v, time)
            };
        }
    }
}

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use glam::{UVec2, Vec3};
use log::{debug, warn};

use crate::config::{validate_resolution, GraphConfig, TransitionMode, GPU_MAX_RESOLUTION};
use crate::error::Result;
use crate::graph::functions::FunctionName;
use crate::graph::{lattice_param, lattice_step};
use crate::graph::schedule::FunctionSchedule;
use crate::math::smoothstep;
use crate::render::Bounds;

/// Threads per work group along x and y (8 x 8 x 1).
pub const GROUP_SIZE: u32 = 8;

/// Kernels per source function: one plain kernel plus one morph per target.
const KERNELS_PER_FUNCTION: u32 = FunctionName::COUNT as u32;

/// Everything the compute pass needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphDispatch {
    /// `target + source * 5`; source equals target outside a transition.
    pub kernel_index: u32,
    pub resolution: u32,
    pub step: f32,
    pub time: f32,
    /// Eased transition progress, 0 outside a transition.
    pub transition_progress: f32,
    /// Work groups in x, y and z.
    pub groups: [u32; 3],
}

impl GraphDispatch {
    pub fn kernel_index(target: FunctionName, source: FunctionName) -> u32 {
        target as u32 + source as u32 * KERNELS_PER_FUNCTION
    }

    /// Source and target functions encoded in `kernel_index`.
    pub fn kernel(&self) -> (FunctionName, FunctionName) {
        (
            FunctionName::from_index(self.kernel_index / KERNELS_PER_FUNCTION),
            FunctionName::from_index(self.kernel_index % KERNELS_PER_FUNCTION),
        )
    }

    pub fn instance_count(&self) -> u32 {
        self.resolution * self.resolution
    }

    /// Culling box: the `[-1, 1]` cube plus one cell for points on its faces.
    pub fn bounds(&self) -> Bounds {
        Bounds::cube(Vec3::ZERO, 2.0 + self.step)
    }
}

/// Executes graph kernels and draws the resulting points.
pub trait ComputeBackend {
    /// Run the kernel selected by `dispatch` over the position buffer.
    fn dispatch(&mut self, dispatch: &GraphDispatch);

    /// Draw `instance_count` points of size `step`.
    fn draw(&mut self, instance_count: u32, step: f32, bounds: Bounds);
}

/// Point graph whose positions are computed by a compute kernel.
///
/// The graph only advances its schedule and fills in a [`GraphDispatch`];
/// the backend owns the position buffer, sized once for the maximum
/// resolution so the resolution can change without reallocating.
pub struct GpuGraph {
    resolution: u32,
    schedule: FunctionSchedule,
}

impl GpuGraph {
    pub fn new(config: &GraphConfig, seed: u32) -> Result<Self> {
        config.validate(GPU_MAX_RESOLUTION)?;
        Ok(Self {
            resolution: config.resolution,
            schedule: FunctionSchedule::new(config, seed),
        })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: u32) -> Result<()> {
        validate_resolution(resolution, GPU_MAX_RESOLUTION)?;
        debug!("gpu graph resolution {} -> {}", self.resolution, resolution);
        self.resolution = resolution;
        Ok(())
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

    /// Advance the schedule and build this frame's dispatch.
    pub fn prepare(&mut self, delta_time: f32, time: f32) -> GraphDispatch {
        self.schedule.advance(delta_time);

        let target = self.schedule.function();
        let (source, transition_progress) = if self.schedule.is_transitioning() {
            (
                self.schedule.transition_function(),
                smoothstep(0.0, 1.0, self.schedule.progress()),
            )
        } else {
            (target, 0.0)
        };
        let groups = self.resolution.div_ceil(GROUP_SIZE);

        GraphDispatch {
            kernel_index: GraphDispatch::kernel_index(target, source),
            resolution: self.resolution,
            step: lattice_step(self.resolution),
            time,
            transition_progress,
            groups: [groups, groups, 1],
        }
    }

    /// Prepare, dispatch and draw one frame.
    pub fn update<B: ComputeBackend>(&mut self, delta_time: f32, time: f32, backend: &mut B) -> GraphDispatch {
        let dispatch = self.prepare(delta_time, time);
        backend.dispatch(&dispatch);
        backend.draw(dispatch.instance_count(), dispatch.step, dispatch.bounds());
        dispatch
    }
}

/// Position of the lattice point at thread id `id` for `dispatch`'s kernel.
///
/// Morph kernels blend linearly: the progress was already eased when the
/// dispatch was prepared.
pub fn kernel_position(dispatch: &GraphDispatch, id: UVec2) -> Vec3 {
    let u = lattice_param(id.x, dispatch.step);
    let v = lattice_param(id.y, dispatch.step);
    let (source, target) = dispatch.kernel();
    let position = target.evaluate(u, v, dispatch.time);
    if source == target {
        position
    } else {
        source
            .evaluate(u, v, dispatch.time)
            .lerp(position, dispatch.transition_progress)
    }
}

/// Runs graph kernels on the CPU, one invocation per lattice point.
pub struct CpuComputeBackend {
    positions: Vec<Vec3>,
    resolution: u32,
    draws: u32,
}

impl Default for CpuComputeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuComputeBackend {
    pub fn new() -> Self {
        let capacity = (GPU_MAX_RESOLUTION * GPU_MAX_RESOLUTION) as usize;
        Self {
            positions: vec![Vec3::ZERO; capacity],
            resolution: 0,
            draws: 0,
        }
    }

    /// Positions written by the last dispatch, `resolution^2` of them.
    pub fn positions(&self) -> &[Vec3] {
        let count = (self.resolution * self.resolution) as usize;
        &self.positions[..count]
    }

    /// Length of the whole buffer, independent of the current resolution.
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    pub fn draw_count(&self) -> u32 {
        self.draws
    }
}

impl ComputeBackend for CpuComputeBackend {
    fn dispatch(&mut self, dispatch: &GraphDispatch) {
        let resolution = dispatch.resolution.min(GPU_MAX_RESOLUTION);
        if resolution != dispatch.resolution {
            warn!(
                "dispatch resolution {} clamped to {}",
                dispatch.resolution, resolution
            );
        }
        self.resolution = resolution;
        if resolution == 0 {
            return;
        }
        let res = resolution as usize;

        // One invocation per lattice point; padding threads of the last groups are skipped.
        let rows = &mut self.positions[..res * res];
        let row_kernel = |(y, row): (usize, &mut [Vec3])| {
            for (x, position) in row.iter_mut().enumerate() {
                *position = kernel_position(dispatch, UVec2::new(x as u32, y as u32));
            }
        };

        #[cfg(feature = "parallel")]
        {
            rows.par_chunks_mut(res).enumerate().for_each(row_kernel);
        }

        #[cfg(not(feature = "parallel"))]
        {
            rows.chunks_mut(res).enumerate().for_each(row_kernel);
        }
    }

    fn draw(&mut self, _instance_count: u32, _step: f32, _bounds: Bounds) {
        self.draws += 1;
    }
}

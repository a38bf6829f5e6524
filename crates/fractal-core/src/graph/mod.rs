//! Point-graph animators.
//!
//! A `resolution x resolution` lattice of points is placed on one of five
//! parametric surfaces and periodically morphs to the next one. `cpu`
//! evaluates positions itself; `gpu` only describes a compute dispatch and
//! leaves the evaluation to a backend.

pub mod functions;
pub mod schedule;
pub mod cpu;
pub mod gpu;

/// Lattice coordinates of point `index`: `(x, z)` with `x` varying fastest.
#[inline]
pub fn lattice_coords(index: usize, resolution: u32) -> (u32, u32) {
    let res = resolution as usize;
    ((index % res) as u32, (index / res) as u32)
}

/// Map a lattice coordinate to the `[-1, 1]` parameter range, sampling the
/// centre of each cell.
#[inline]
pub fn lattice_param(coord: u32, step: f32) -> f32 {
    (coord as f32 + 0.5) * step - 1.0
}

/// Cell size of a lattice spanning `[-1, 1]`.
#[inline]
pub fn lattice_step(resolution: u32) -> f32 {
    2.0 / resolution as f32
}

//! Renderer collaborator interface.
//!
//! The core never draws. Each frame it hands every level's packed matrices
//! to a [`Renderer`], which owns the per-level instance buffers and issues
//! one instanced draw per level.

use glam::Vec3;

use crate::fractal::matrix::PackedMatrix;

/// Axis-aligned box used to cull an instanced draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    /// Box of edge 3 around the origin. The offsets 1.5 * 0.5^L sum to less
    /// than 1.5, so this holds the fractal at any depth.
    pub const FRACTAL: Self = Self::cube(Vec3::ZERO, 3.0);

    pub const fn cube(center: Vec3, edge: f32) -> Self {
        Self {
            center,
            size: Vec3::splat(edge),
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min()).all() && point.cmple(self.max()).all()
    }
}

pub trait Renderer {
    /// Size the persistent buffer of `level` for `count` matrices.
    fn allocate_level_buffer(&mut self, level: usize, count: usize);

    /// Drop every level buffer, ahead of a depth change.
    fn release_level_buffers(&mut self);

    /// Upload one level's matrices and draw `instance_count` instances.
    fn upload_and_draw(
        &mut self,
        level: usize,
        matrices: &[PackedMatrix],
        instance_count: usize,
        bounds: Bounds,
    );
}

/// One recorded instanced draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub level: usize,
    pub instance_count: usize,
    pub bounds: Bounds,
}

/// Headless renderer: keeps the uploaded buffers and a log of draw calls.
#[derive(Default)]
pub struct RecordingRenderer {
    buffers: Vec<Vec<PackedMatrix>>,
    draws: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer(&self, level: usize) -> Option<&[PackedMatrix]> {
        self.buffers.get(level).map(Vec::as_slice)
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Hand over and forget the recorded draws.
    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }
}

impl Renderer for RecordingRenderer {
    fn allocate_level_buffer(&mut self, level: usize, count: usize) {
        if self.buffers.len() <= level {
            self.buffers.resize_with(level + 1, Vec::new);
        }
        self.buffers[level] = vec![PackedMatrix::default(); count];
    }

    fn release_level_buffers(&mut self) {
        self.buffers.clear();
    }

    fn upload_and_draw(
        &mut self,
        level: usize,
        matrices: &[PackedMatrix],
        instance_count: usize,
        bounds: Bounds,
    ) {
        let Some(buffer) = self.buffers.get_mut(level) else {
            return;
        };
        debug_assert_eq!(buffer.len(), matrices.len(), "level {} buffer size mismatch", level);
        let n = buffer.len().min(matrices.len());
        buffer[..n].copy_from_slice(&matrices[..n]);
        self.draws.push(DrawCall {
            level,
            instance_count,
            bounds,
        });
    }
}

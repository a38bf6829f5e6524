#[cfg(feature = "parallel")]
use rayon::prelude::*;

use glam::Vec3;
use log::{debug, trace, warn};

use crate::config::FractalConfig;
use crate::error::{FractalError, Result};
use crate::fractal::matrix::PackedMatrix;
use crate::fractal::part::{parent_index, wrap_angle, FractalPart, CHILD_OFFSET};
use crate::fractal::store::PartStore;
use crate::math::level_scale;
use crate::render::{Bounds, Renderer};

/// Fractal driven by one centralized per-frame update.
///
/// Owns the part store and the per-level matrix arrays, which always have
/// the same shape: both are rebuilt together inside `set_depth`.
pub struct Fractal {
    config: FractalConfig,
    store: PartStore,
    matrices: Vec<Vec<PackedMatrix>>,
}

impl Fractal {
    pub fn new(config: FractalConfig) -> Result<Self> {
        config.validate()?;
        let store = PartStore::new(config.depth)?;
        let matrices = allocate_matrices(&store);
        Ok(Self {
            config,
            store,
            matrices,
        })
    }

    pub fn config(&self) -> &FractalConfig {
        &self.config
    }

    pub fn store(&self) -> &PartStore {
        &self.store
    }

    pub fn depth(&self) -> usize {
        self.store.depth()
    }

    /// Matrices emitted for `level` by the last frame.
    pub fn matrices(&self, level: usize) -> Result<&[PackedMatrix]> {
        self.matrices
            .get(level)
            .map(Vec::as_slice)
            .ok_or(FractalError::LevelOutOfRange {
                level,
                levels: self.matrices.len(),
            })
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::FRACTAL
    }

    /// Rebuild the store and matrix arrays for a new depth.
    ///
    /// Validation happens first; on error nothing changes. On success all
    /// parts restart from their initial state, and renderer buffers must be
    /// reallocated with `allocate_buffers`.
    pub fn set_depth(&mut self, depth: usize) -> Result<()> {
        crate::config::validate_depth(depth)?;
        debug!("fractal depth {} -> {}", self.store.depth(), depth);
        self.matrices = Vec::new();
        self.store.initialize(depth)?;
        self.matrices = allocate_matrices(&self.store);
        self.config.depth = depth;
        Ok(())
    }

    /// Size the renderer's level buffers to match the current store.
    pub fn allocate_buffers<R: Renderer>(&self, renderer: &mut R) {
        renderer.release_level_buffers();
        for (level, matrices) in self.matrices.iter().enumerate() {
            renderer.allocate_level_buffer(level, matrices.len());
        }
    }

    /// Advance by `delta_time` seconds of the host's frame clock.
    pub fn update(&mut self, delta_time: f32) {
        self.advance_frame(self.config.angular_speed * delta_time);
    }

    /// Spin every part by `spin_angle_delta` radians and propagate world
    /// transforms from the root down, one level at a time.
    ///
    /// Each level reads only the fully updated level above it. Within a level
    /// every part writes its own slot and reads only its parent, so the
    /// `parallel` feature splits a level across worker threads without
    /// changing the output.
    pub fn advance_frame(&mut self, spin_angle_delta: f32) {
        if !spin_angle_delta.is_finite() {
            warn!("ignoring non-finite spin delta {}", spin_angle_delta);
            return;
        }
        let Some(root) = self.store.root_mut() else {
            return;
        };
        self.matrices[0][0] = advance_root(root, spin_angle_delta);

        let batch_size = self.config.batch_size.max(1);
        for level in 1..self.store.depth() {
            let scale = level_scale(level);
            let (parents, parts) = self.store.split_level_mut(level);
            update_level(
                parents,
                parts,
                &mut self.matrices[level],
                spin_angle_delta,
                scale,
                batch_size,
            );
        }
        trace!("fractal frame advanced by {} rad", spin_angle_delta);
    }

    /// Hand every level to the renderer, root first.
    pub fn render<R: Renderer>(&self, renderer: &mut R) {
        let bounds = self.bounds();
        for (level, matrices) in self.matrices.iter().enumerate() {
            renderer.upload_and_draw(level, matrices, matrices.len(), bounds);
        }
    }
}

fn allocate_matrices(store: &PartStore) -> Vec<Vec<PackedMatrix>> {
    store
        .levels()
        .map(|parts| vec![PackedMatrix::default(); parts.len()])
        .collect()
}

/// Spin the root in place. It has no parent and never leaves the origin.
pub fn advance_root(root: &mut FractalPart, spin_angle_delta: f32) -> PackedMatrix {
    root.spin_angle = wrap_angle(root.spin_angle + spin_angle_delta);
    root.world_rotation = root.spun_rotation();
    root.world_position = Vec3::ZERO;
    PackedMatrix::pack(root.world_rotation, root.world_position, 1.0)
}

/// Update one non-root part from its already updated parent.
///
/// The child's own spun rotation is applied first, then the parent's.
#[inline]
pub fn propagate(
    parent: &FractalPart,
    part: &mut FractalPart,
    spin_angle_delta: f32,
    scale: f32,
) -> PackedMatrix {
    part.spin_angle = wrap_angle(part.spin_angle + spin_angle_delta);
    part.world_rotation = parent.world_rotation * part.spun_rotation();
    part.world_position =
        parent.world_position + parent.world_rotation * (CHILD_OFFSET * scale * part.direction());
    PackedMatrix::pack(part.world_rotation, part.world_position, scale)
}

/// Update every part of one level.
pub fn update_level(
    parents: &[FractalPart],
    parts: &mut [FractalPart],
    matrices: &mut [PackedMatrix],
    spin_angle_delta: f32,
    scale: f32,
    batch_size: usize,
) {
    #[cfg(feature = "parallel")]
    {
        parts
            .par_iter_mut()
            .zip(matrices.par_iter_mut())
            .enumerate()
            .with_min_len(batch_size)
            .for_each(|(i, (part, matrix))| {
                *matrix = propagate(&parents[parent_index(i)], part, spin_angle_delta, scale);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        let _ = batch_size;
        for (i, (part, matrix)) in parts.iter_mut().zip(matrices.iter_mut()).enumerate() {
            *matrix = propagate(&parents[parent_index(i)], part, spin_angle_delta, scale);
        }
    }
}

use log::debug;

use crate::config::validate_depth;
use crate::error::{FractalError, Result};
use crate::fractal::part::{child_slot, FractalPart};
use crate::math::{level_len, total_parts};

/// Level-indexed part storage.
///
/// Level `L` holds `5^L` parts; the parent of `(L, i)` is `(L - 1, i / 5)`.
/// The tree is never stored as references, only implied by the indices.
/// Sizes are fixed at `initialize` and only change through another
/// `initialize` call.
#[derive(Default)]
pub struct PartStore {
    levels: Vec<Vec<FractalPart>>,
}

impl PartStore {
    /// Create an initialized store with `depth` levels.
    pub fn new(depth: usize) -> Result<Self> {
        let mut store = Self::default();
        store.initialize(depth)?;
        Ok(store)
    }

    /// Allocate `depth` levels and assign every part its slot's
    /// direction and rotation.
    ///
    /// The depth is validated before anything is released, so an invalid
    /// depth leaves the current levels untouched. A valid call first tears
    /// down the current levels completely.
    pub fn initialize(&mut self, depth: usize) -> Result<()> {
        validate_depth(depth)?;
        self.teardown();

        let mut levels = Vec::with_capacity(depth);
        for level in 0..depth {
            let parts: Vec<FractalPart> = (0..level_len(level))
                .map(|i| FractalPart::for_slot(child_slot(i)))
                .collect();
            levels.push(parts);
        }
        self.levels = levels;

        debug!(
            "part store initialized: depth {} ({} parts)",
            depth,
            total_parts(depth)
        );
        Ok(())
    }

    /// Release every level. The store can be initialized again afterwards.
    pub fn teardown(&mut self) {
        if !self.levels.is_empty() {
            debug!("part store torn down ({} levels)", self.levels.len());
        }
        self.levels = Vec::new();
    }

    pub fn is_initialized(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Number of levels, 0 after `teardown`.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn total_parts(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn level(&self, level: usize) -> Result<&[FractalPart]> {
        self.levels
            .get(level)
            .map(Vec::as_slice)
            .ok_or(FractalError::LevelOutOfRange {
                level,
                levels: self.levels.len(),
            })
    }

    pub fn root(&self) -> Result<&FractalPart> {
        self.levels
            .first()
            .and_then(|root| root.first())
            .ok_or(FractalError::NotInitialized)
    }

    pub fn part(&self, level: usize, index: usize) -> Option<&FractalPart> {
        self.levels.get(level).and_then(|parts| parts.get(index))
    }

    pub fn levels(&self) -> impl Iterator<Item = &[FractalPart]> {
        self.levels.iter().map(Vec::as_slice)
    }

    pub(crate) fn root_mut(&mut self) -> Option<&mut FractalPart> {
        self.levels.first_mut().and_then(|root| root.first_mut())
    }

    /// Finalized parent level and the mutable level below it.
    ///
    /// `level` must be in `1..depth`.
    pub(crate) fn split_level_mut(&mut self, level: usize) -> (&[FractalPart], &mut [FractalPart]) {
        let (done, rest) = self.levels.split_at_mut(level);
        (&done[level - 1], &mut rest[0])
    }
}

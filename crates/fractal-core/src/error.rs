use thiserror::Error;

/// Errors surfaced to the host when configuring fractals and graphs.
///
/// All of them are raised before any storage is touched, so a failed call
/// leaves the previous state intact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FractalError {
    /// Fractal depth outside `MIN_DEPTH..=MAX_DEPTH`.
    #[error("fractal depth {depth} is outside the supported range 1..=8")]
    InvalidDepth { depth: usize },

    /// Graph resolution is zero or above the backend's maximum.
    #[error("graph resolution {resolution} is outside the supported range 1..={max}")]
    InvalidResolution { resolution: u32, max: u32 },

    /// A level index past the last level of the store.
    #[error("level {level} does not exist (store has {levels} levels)")]
    LevelOutOfRange { level: usize, levels: usize },

    /// The store was torn down and not re-initialized.
    #[error("part store is not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, FractalError>;

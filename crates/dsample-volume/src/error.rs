use std::collections::TryReserveError;

/// Errors returned by volume construction and smoothing.
#[derive(thiserror::Error, Debug)]
pub enum VolumeError {
    #[error("invalid volume dimensions (width={width}, height={height}, depth={depth})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        depth: usize,
    },

    #[error("invalid voxel buffer length (expected {expected} voxels, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("volume allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("volume is {got:?}, expected {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },

    #[error("smoothing radius {radius} must be in 1..={max}")]
    InvalidRadius { radius: usize, max: usize },

    #[error("smoothing sigma must be finite and positive (got {sigma})")]
    InvalidSigma { sigma: f32 },
}

use std::collections::TryReserveError;

use dsample_core::GridError;

/// Errors returned by the downsampling session.
#[derive(thiserror::Error, Debug)]
pub enum DownsampleError {
    #[error("invalid grid dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid source pixel buffer length (expected {expected} pixels, got {got})")]
    InvalidPixelBuffer { expected: usize, got: usize },

    #[error("buffer allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("grid is {got:?}, expected {expected:?}")]
    GridSizeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("{stage} radius must be positive")]
    ZeroRadius { stage: &'static str },

    #[error("{stage} radius {radius} exceeds the maximum of {max}")]
    RadiusTooLarge {
        stage: &'static str,
        radius: usize,
        max: usize,
    },

    #[error("{stage} sigma must be finite and positive (got {sigma})")]
    InvalidSigma { stage: &'static str, sigma: f32 },

    #[error("residual weights sum to zero around destination pixel ({x}, {y})")]
    DegenerateWeightSum { x: usize, y: usize },
}

impl From<GridError> for DownsampleError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::InvalidDimensions { width, height } => {
                Self::InvalidDimensions { width, height }
            }
            GridError::InvalidBuffer { expected, got } => Self::InvalidPixelBuffer { expected, got },
            GridError::Allocation(e) => Self::Allocation(e),
        }
    }
}

use std::collections::TryReserveError;

/// Errors returned when building a grid.
#[derive(thiserror::Error, Debug)]
pub enum GridError {
    #[error("invalid grid dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid pixel buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("grid allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

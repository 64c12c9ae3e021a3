//! Downsampling session.
//!
//! This module wires the stage functions together over grids owned by one
//! [`Downsampler`]: normalized source, subsample, gauss, bilateral,
//! downsampled and the source-resolution restored grid.

mod error;
mod params;
mod session;
mod stats;

pub use error::DownsampleError;
pub use params::{DegeneratePolicy, DownsampleParams, KernelParams};
pub use session::Downsampler;
pub use stats::DownsampleStats;

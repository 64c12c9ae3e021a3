//! High-level facade crate for the `dsample-*` workspace.
//!
//! This crate provides:
//! - re-exports of the planar pipeline (`dsample-2d`), the volume smoother
//!   (`dsample-volume`) and the shared core types;
//! - (feature `image`) helpers that move `image::GrayImage` data in and out
//!   of the float grids and run the full pipeline on a decoded image;
//! - (feature `cli`) the `dsample` binary.
//!
//! ## Quickstart
//!
//! ```no_run
//! use dsample::gray;
//! use dsample::DownsampleParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = gray::load_gray("slice.png")?;
//! let (session, stats) = gray::downsample_gray_image(&img, 179, 179, DownsampleParams::default())?;
//! gray::save_gray(&session.downsampled(), "slice_small.png")?;
//! println!("final stage: {:.2} ms", stats.final_ms);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dsample::core`: grids, window mapping, Gaussian kernels, logger.
//! - `dsample::planar`: the [`Downsampler`] session and its stages.
//! - `dsample::volume`: slow/fast 3D Gaussian smoothing.
//! - `dsample::gray` (feature `image`): `image::GrayImage` conversions.

pub use dsample_2d as planar;
pub use dsample_core as core;
pub use dsample_volume as volume;

pub use dsample_2d::{
    DegeneratePolicy, DownsampleConfig, DownsampleError, DownsampleParams, DownsampleReport,
    DownsampleStats, Downsampler,
};
pub use dsample_core::{FloatGrid, FloatGridView};
pub use dsample_volume::{volume_gauss_fast, volume_gauss_slow, VolumeError, VolumeGaussParams};

#[cfg(feature = "image")]
pub mod gray;

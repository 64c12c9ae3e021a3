//! Content-adaptive 2D downsampling.
//!
//! Based on J. Diaz-Garcia, P. Brunet, I. Navazo, P. Vazquez,
//! "Downsampling Methods for Medical Datasets" (2017).
//!
//! A [`Downsampler`] session owns the normalized source and every
//! intermediate grid. [`Downsampler::run_all`] executes, in order:
//! 1. nearest-neighbour subsample (diagnostic),
//! 2. reference Gaussian (diagnostic),
//! 3. bilateral filter (diagnostic),
//! 4. final downsample: fast Gaussian, bilinear restore to source resolution,
//!    then a Gaussian resample weighted by the local squared residual
//!    `|source - restored|²`, which favours detail the blur lost.
//!
//! ## Quickstart
//!
//! ```
//! use dsample_2d::Downsampler;
//!
//! # fn main() -> Result<(), dsample_2d::DownsampleError> {
//! let (w, h) = (64, 48);
//! let pixels: Vec<u32> = (0..w * h).map(|i| (i % 251) as u32).collect();
//! let mut session = Downsampler::new(w, h, &pixels, 22, 16)?;
//! let stats = session.run_all()?;
//! assert_eq!(session.downsampled().dims(), (22, 16));
//! println!("fallback pixels: {}", stats.fallback_pixels);
//! # Ok(())
//! # }
//! ```
//!
//! The Gaussian stage ships as a per-sample reference ([`gauss_slow`]) and a
//! table-driven variant ([`gauss_fast`]); the reference stays the oracle the
//! fast path is tested against.

mod bilateral;
mod downsampler;
mod gauss;
mod io;
mod residual;
mod restore;
mod subsample;

pub use bilateral::{bilateral, BilateralParams, BILATERAL_RADIUS};
pub use downsampler::{
    DegeneratePolicy, DownsampleError, DownsampleParams, DownsampleStats, Downsampler,
    KernelParams,
};
pub use gauss::{gauss_fast, gauss_slow, GAUSS_RADIUS, GAUSS_SIGMA};
pub use io::{DownsampleConfig, DownsampleReport, DsampleIoError, DEFAULT_SCALE};
pub use residual::{residual_downsample, FilterScratch, RESIDUAL_RADIUS, RESIDUAL_SIGMA};
pub use restore::upsample_bilinear;
pub use subsample::subsample;

pub use dsample_core::{FloatGrid, FloatGridView, GaussianKernel, KernelFalloff};

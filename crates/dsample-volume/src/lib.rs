//! Gaussian smoothing of 8-bit volumes.
//!
//! Every output voxel is the normalized Gaussian average of its
//! `(2R+1)³` neighbourhood, with out-of-volume neighbours dropped. Two passes
//! produce byte-identical results:
//! - [`gauss_smooth_slow_into`] evaluates `exp` for every neighbour;
//! - [`gauss_smooth_fast_into`] reads weights from a [`VolumeKernel`] table
//!   and clips each axis once.
//!
//! ```
//! use dsample_volume::{volume_gauss_fast, volume_gauss_slow};
//!
//! # fn main() -> Result<(), dsample_volume::VolumeError> {
//! let (w, h, d) = (8, 6, 4);
//! let voxels: Vec<u8> = (0..w * h * d).map(|i| (i * 37 % 256) as u8).collect();
//! let slow = volume_gauss_slow(&voxels, w, h, d)?;
//! let fast = volume_gauss_fast(&voxels, w, h, d)?;
//! assert_eq!(slow, fast);
//! # Ok(())
//! # }
//! ```

mod error;
mod kernel;
mod smooth;
mod volume;

pub use error::VolumeError;
pub use kernel::{VolumeGaussParams, VolumeKernel, VOLUME_GAUSS_RADIUS, VOLUME_GAUSS_SIGMA};
pub use smooth::{
    gauss_smooth_fast_into, gauss_smooth_slow_into, volume_gauss_fast, volume_gauss_fast_with,
    volume_gauss_slow, volume_gauss_slow_with,
};
pub use volume::{Volume, VolumeView};

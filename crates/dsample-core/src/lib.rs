//! Core types and utilities for content-adaptive downsampling.
//!
//! This crate is intentionally small and purely numeric. It does *not*
//! depend on any concrete image codec or volume container.
//!
//! - [`FloatGrid`] / [`FloatGridView`]: dense row-major `f32` grids.
//! - [`map_floor`] and [`WindowRange`]: the floor coordinate mapping and the
//!   border-truncated window every filter stage shares.
//! - [`GaussianKernel`]: Gaussian weights over a square window, evaluated
//!   per sample or read from a precomputed table.

mod error;
mod grid;
mod kernel;
mod logger;
mod window;

pub use error::GridError;
pub use grid::{sample_bilinear_clamped, FloatGrid, FloatGridView, INV_255};
pub use kernel::{gaussian_rate, GaussianKernel, KernelFalloff, MAX_KERNEL_RADIUS};
pub use window::{map_floor, WindowRange};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

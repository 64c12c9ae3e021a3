//! Residual-weighted final resample.
//!
//! For each destination pixel, the squared residual `|src - restored|²` over
//! the source window is normalized into a weight field, which then multiplies
//! the Gaussian weights of the final average. Regions where blur-and-restore
//! lost the most information dominate the result.

use std::collections::TryReserveError;

use dsample_core::{map_floor, FloatGrid, FloatGridView, GaussianKernel, WindowRange};

use crate::{DegeneratePolicy, DownsampleError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Default window radius of the residual stage.
pub const RESIDUAL_RADIUS: usize = 8;
/// Default sigma of the residual-stage Gaussian.
pub const RESIDUAL_SIGMA: f32 = 1.5;

/// Per-pixel residual weight field, `(2R+1)²` entries.
///
/// Allocated once and cleared before every destination pixel.
#[derive(Clone, Debug)]
pub struct FilterScratch {
    radius: usize,
    weights: Vec<f32>,
}

impl FilterScratch {
    pub fn try_new(radius: usize) -> Result<Self, TryReserveError> {
        let d = 2 * radius + 1;
        let mut weights = Vec::new();
        weights.try_reserve_exact(d * d)?;
        weights.resize(d * d, 0.0);
        Ok(Self { radius, weights })
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    #[inline]
    pub fn diameter(&self) -> usize {
        2 * self.radius + 1
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    fn clear(&mut self) {
        self.weights.fill(0.0);
    }

    /// Fill the window with squared residuals. Returns their sum.
    fn fill(
        &mut self,
        src: &FloatGridView<'_>,
        restored: &FloatGridView<'_>,
        rows: &WindowRange,
        cols: &WindowRange,
    ) -> f32 {
        let d = self.diameter();
        let mut sum = 0.0f32;
        for (y, ky) in rows.coords().zip(rows.kernel_coords()) {
            let src_row = &src.row(y)[cols.coords()];
            let smo_row = &restored.row(y)[cols.coords()];
            let out = &mut self.weights[ky * d..(ky + 1) * d][cols.kernel_coords()];
            for ((w, &s), &r) in out.iter_mut().zip(src_row).zip(smo_row) {
                let delta = (s - r).abs();
                *w = delta * delta;
                sum += *w;
            }
        }
        sum
    }

    fn scale(&mut self, factor: f32) {
        for w in &mut self.weights {
            *w *= factor;
        }
    }
}

/// Plain Gaussian average over the window; the value used when the residual
/// weights cannot be normalized.
fn gaussian_average(
    src: &FloatGridView<'_>,
    kernel: &GaussianKernel,
    rows: &WindowRange,
    cols: &WindowRange,
) -> f32 {
    let mut sum = 0.0f32;
    let mut sum_weights = 0.0f32;
    for (y, ky) in rows.coords().zip(rows.kernel_coords()) {
        let samples = &src.row(y)[cols.coords()];
        let weights = &kernel.row(ky)[cols.kernel_coords()];
        for (&v, &g) in samples.iter().zip(weights) {
            sum += v * g;
            sum_weights += g;
        }
    }
    sum / sum_weights
}

/// Residual-weighted resample of `src` into `dst`.
///
/// `restored` must have the source dimensions and `kernel` must have the same
/// radius as `scratch`. Returns how many pixels fell back to the plain
/// Gaussian average under [`DegeneratePolicy::GaussFallback`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(src = ?src.dims(), dst = ?dst.dims(), radius = kernel.radius()))
)]
pub fn residual_downsample(
    src: &FloatGridView<'_>,
    restored: &FloatGridView<'_>,
    dst: &mut FloatGrid,
    kernel: &GaussianKernel,
    scratch: &mut FilterScratch,
    policy: DegeneratePolicy,
) -> Result<usize, DownsampleError> {
    debug_assert_eq!(src.dims(), restored.dims());
    debug_assert_eq!(kernel.radius(), scratch.radius());

    let r = kernel.radius();
    let d = kernel.diameter();
    let (dst_w, dst_h) = dst.dims();
    let mut fallbacks = 0usize;

    for y_small in 0..dst_h {
        let rows = WindowRange::new(map_floor(y_small, src.height, dst_h), r, src.height);
        for x_small in 0..dst_w {
            let cols = WindowRange::new(map_floor(x_small, src.width, dst_w), r, src.width);

            scratch.clear();
            let residual_sum = scratch.fill(src, restored, &rows, &cols);
            let norm = 1.0 / residual_sum;

            let value = if residual_sum > 0.0 && norm.is_finite() {
                scratch.scale(norm);
                let mut sum = 0.0f32;
                let mut sum_weights = 0.0f32;
                for (y, ky) in rows.coords().zip(rows.kernel_coords()) {
                    let samples = &src.row(y)[cols.coords()];
                    let gauss = &kernel.row(ky)[cols.kernel_coords()];
                    let filter = &scratch.weights[ky * d..(ky + 1) * d][cols.kernel_coords()];
                    for ((&v, &g), &f) in samples.iter().zip(gauss).zip(filter) {
                        sum += v * g * f;
                        sum_weights += g * f;
                    }
                }
                let v = sum / sum_weights;
                (sum_weights > 0.0 && v.is_finite()).then_some(v)
            } else {
                None
            };

            dst.data[x_small + y_small * dst_w] = match value {
                Some(v) => v,
                None => match policy {
                    DegeneratePolicy::GaussFallback => {
                        fallbacks += 1;
                        gaussian_average(src, kernel, &rows, &cols)
                    }
                    DegeneratePolicy::Error => {
                        return Err(DownsampleError::DegenerateWeightSum {
                            x: x_small,
                            y: y_small,
                        })
                    }
                },
            };
        }
    }
    Ok(fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsample_core::KernelFalloff;

    fn residual_kernel(radius: usize) -> GaussianKernel {
        GaussianKernel::with_falloff(radius, RESIDUAL_SIGMA, KernelFalloff::Inverse)
    }

    #[test]
    fn scratch_is_sized_by_radius() {
        let s = FilterScratch::try_new(RESIDUAL_RADIUS).expect("scratch");
        assert_eq!(s.weights().len(), 17 * 17);
        assert!(s.weights().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn flat_window_falls_back_to_gaussian_average() {
        let mut src = FloatGrid::try_new(20, 20).expect("src");
        src.data.fill(0.25);
        let restored = src.clone();
        let kernel = residual_kernel(4);
        let mut scratch = FilterScratch::try_new(4).expect("scratch");
        let mut dst = FloatGrid::try_new(5, 5).expect("dst");

        let fallbacks = residual_downsample(
            &src.view(),
            &restored.view(),
            &mut dst,
            &kernel,
            &mut scratch,
            DegeneratePolicy::GaussFallback,
        )
        .expect("fallback policy never fails");
        assert_eq!(fallbacks, 25);
        for &v in &dst.data {
            assert!((v - 0.25).abs() < 1e-5, "{v}");
        }
    }

    #[test]
    fn flat_window_is_an_error_under_strict_policy() {
        let src = FloatGrid::try_new(10, 10).expect("src");
        let restored = src.clone();
        let kernel = residual_kernel(2);
        let mut scratch = FilterScratch::try_new(2).expect("scratch");
        let mut dst = FloatGrid::try_new(3, 3).expect("dst");

        let err = residual_downsample(
            &src.view(),
            &restored.view(),
            &mut dst,
            &kernel,
            &mut scratch,
            DegeneratePolicy::Error,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DownsampleError::DegenerateWeightSum { x: 0, y: 0 }
        ));
    }

    #[test]
    fn residual_pulls_toward_lost_detail() {
        // a single bright dot the restored image smeared out entirely
        let mut src = FloatGrid::try_new(9, 9).expect("src");
        src.data[1 + 9] = 1.0;
        let mut restored = FloatGrid::try_new(9, 9).expect("restored");
        restored.data.fill(1.0 / 81.0);

        let kernel = residual_kernel(4);
        let mut scratch = FilterScratch::try_new(4).expect("scratch");
        let mut dst = FloatGrid::try_new(1, 1).expect("dst");
        residual_downsample(
            &src.view(),
            &restored.view(),
            &mut dst,
            &kernel,
            &mut scratch,
            DegeneratePolicy::Error,
        )
        .expect("residual is non-zero everywhere");

        let plain = gaussian_average(
            &src.view(),
            &kernel,
            &WindowRange::new(0, 4, 9),
            &WindowRange::new(0, 4, 9),
        );
        assert!(dst.data[0] > plain, "adaptive {} plain {}", dst.data[0], plain);
    }
}

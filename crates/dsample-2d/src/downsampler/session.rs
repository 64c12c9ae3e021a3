use std::time::Instant;

use dsample_core::{FloatGrid, FloatGridView, GaussianKernel, KernelFalloff};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{DownsampleError, DownsampleParams, DownsampleStats};
use crate::{
    bilateral, gauss_fast, gauss_slow, residual_downsample, subsample, upsample_bilinear,
    BilateralParams, FilterScratch,
};

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

fn check_sigma(stage: &'static str, sigma: f32) -> Result<(), DownsampleError> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(())
    } else {
        Err(DownsampleError::InvalidSigma { stage, sigma })
    }
}

/// One downsampling task: a normalized source image and every intermediate
/// grid, allocated once at creation and never resized.
///
/// The subsample, gauss, bilateral and downsampled grids have the destination
/// size; the restored grid has the source size.
#[derive(Clone, Debug)]
pub struct Downsampler {
    params: DownsampleParams,
    source: FloatGrid,
    subsample: FloatGrid,
    gauss: FloatGrid,
    bilateral: FloatGrid,
    downsampled: FloatGrid,
    restored: FloatGrid,
    gauss_kernel: GaussianKernel,
    residual_kernel: GaussianKernel,
    scratch: FilterScratch,
}

impl Downsampler {
    /// Create a session with default parameters.
    ///
    /// `pixels` are row-major packed 32-bit pixels; only the low byte of each
    /// is used as intensity.
    pub fn new(
        src_width: usize,
        src_height: usize,
        pixels: &[u32],
        dst_width: usize,
        dst_height: usize,
    ) -> Result<Self, DownsampleError> {
        Self::with_params(
            src_width,
            src_height,
            pixels,
            dst_width,
            dst_height,
            DownsampleParams::default(),
        )
    }

    pub fn with_params(
        src_width: usize,
        src_height: usize,
        pixels: &[u32],
        dst_width: usize,
        dst_height: usize,
        params: DownsampleParams,
    ) -> Result<Self, DownsampleError> {
        let source = FloatGrid::from_packed(src_width, src_height, pixels)?;
        Self::from_source(source, dst_width, dst_height, params)
    }

    /// Create a session from 8-bit grayscale samples.
    pub fn from_gray_u8(
        src_width: usize,
        src_height: usize,
        pixels: &[u8],
        dst_width: usize,
        dst_height: usize,
        params: DownsampleParams,
    ) -> Result<Self, DownsampleError> {
        let source = FloatGrid::from_gray_u8(src_width, src_height, pixels)?;
        Self::from_source(source, dst_width, dst_height, params)
    }

    /// Create a session around an already-normalized source grid.
    pub fn from_source(
        source: FloatGrid,
        dst_width: usize,
        dst_height: usize,
        params: DownsampleParams,
    ) -> Result<Self, DownsampleError> {
        params.validate()?;
        let (src_width, src_height) = source.dims();
        let restored = FloatGrid::try_new(src_width, src_height)?;
        if source.data.len() != restored.data.len() {
            return Err(DownsampleError::InvalidPixelBuffer {
                expected: restored.data.len(),
                got: source.data.len(),
            });
        }

        let subsample = FloatGrid::try_new(dst_width, dst_height)?;
        let gauss = FloatGrid::try_new(dst_width, dst_height)?;
        let bilateral = FloatGrid::try_new(dst_width, dst_height)?;
        let downsampled = FloatGrid::try_new(dst_width, dst_height)?;
        let scratch = FilterScratch::try_new(params.residual.radius)?;

        let gauss_kernel = GaussianKernel::new(params.gauss.radius, params.gauss.sigma);
        let residual_kernel = GaussianKernel::with_falloff(
            params.residual.radius,
            params.residual.sigma,
            KernelFalloff::Inverse,
        );

        debug!(
            "downsampler session {}x{} -> {}x{}",
            src_width, src_height, dst_width, dst_height
        );

        Ok(Self {
            params,
            source,
            subsample,
            gauss,
            bilateral,
            downsampled,
            restored,
            gauss_kernel,
            residual_kernel,
            scratch,
        })
    }

    #[inline]
    pub fn params(&self) -> &DownsampleParams {
        &self.params
    }

    #[inline]
    pub fn src_dims(&self) -> (usize, usize) {
        self.source.dims()
    }

    #[inline]
    pub fn dst_dims(&self) -> (usize, usize) {
        self.downsampled.dims()
    }

    /// Normalized source, `[0, 1]`.
    #[inline]
    pub fn source(&self) -> FloatGridView<'_> {
        self.source.view()
    }

    #[inline]
    pub fn subsample(&self) -> FloatGridView<'_> {
        self.subsample.view()
    }

    #[inline]
    pub fn gauss(&self) -> FloatGridView<'_> {
        self.gauss.view()
    }

    #[inline]
    pub fn bilateral(&self) -> FloatGridView<'_> {
        self.bilateral.view()
    }

    /// Final residual-weighted result.
    #[inline]
    pub fn downsampled(&self) -> FloatGridView<'_> {
        self.downsampled.view()
    }

    /// Gauss grid upsampled back to source resolution.
    #[inline]
    pub fn restored(&self) -> FloatGridView<'_> {
        self.restored.view()
    }

    #[inline]
    pub fn sigma_bilateral_pos(&self) -> f32 {
        self.params.bilateral.sigma_pos
    }

    #[inline]
    pub fn sigma_bilateral_val(&self) -> f32 {
        self.params.bilateral.sigma_val
    }

    /// Takes effect on the next bilateral run.
    pub fn set_sigma_bilateral_pos(&mut self, sigma: f32) -> Result<(), DownsampleError> {
        check_sigma("bilateral position", sigma)?;
        self.params.bilateral.sigma_pos = sigma;
        Ok(())
    }

    /// Takes effect on the next bilateral run.
    pub fn set_sigma_bilateral_val(&mut self, sigma: f32) -> Result<(), DownsampleError> {
        check_sigma("bilateral value", sigma)?;
        self.params.bilateral.sigma_val = sigma;
        Ok(())
    }

    pub fn set_bilateral_params(&mut self, params: BilateralParams) -> Result<(), DownsampleError> {
        check_sigma("bilateral position", params.sigma_pos)?;
        check_sigma("bilateral value", params.sigma_val)?;
        self.params.bilateral = params;
        Ok(())
    }

    fn check_shapes(
        &self,
        src: &FloatGridView<'_>,
        dst: &FloatGrid,
    ) -> Result<(), DownsampleError> {
        if src.dims() != self.src_dims() || src.data.len() != self.source.data.len() {
            return Err(DownsampleError::GridSizeMismatch {
                expected: self.src_dims(),
                got: src.dims(),
            });
        }
        if dst.dims() != self.dst_dims() || dst.data.len() != self.downsampled.data.len() {
            return Err(DownsampleError::GridSizeMismatch {
                expected: self.dst_dims(),
                got: dst.dims(),
            });
        }
        Ok(())
    }

    /// Reference Gaussian from any source-sized grid into any
    /// destination-sized grid.
    pub fn gauss_slow_into(
        &self,
        src: &FloatGridView<'_>,
        dst: &mut FloatGrid,
    ) -> Result<(), DownsampleError> {
        self.check_shapes(src, dst)?;
        gauss_slow(src, dst, &self.gauss_kernel);
        Ok(())
    }

    /// Table-driven Gaussian from any source-sized grid into any
    /// destination-sized grid.
    pub fn gauss_fast_into(
        &self,
        src: &FloatGridView<'_>,
        dst: &mut FloatGrid,
    ) -> Result<(), DownsampleError> {
        self.check_shapes(src, dst)?;
        gauss_fast(src, dst, &self.gauss_kernel);
        Ok(())
    }

    pub fn run_subsample(&mut self) {
        subsample(&self.source.view(), &mut self.subsample);
    }

    /// Reference Gaussian of the source into the gauss grid.
    pub fn run_gauss_slow(&mut self) {
        gauss_slow(&self.source.view(), &mut self.gauss, &self.gauss_kernel);
    }

    /// Table-driven Gaussian of the source into the gauss grid.
    pub fn run_gauss_fast(&mut self) {
        gauss_fast(&self.source.view(), &mut self.gauss, &self.gauss_kernel);
    }

    pub fn run_bilateral(&mut self) {
        bilateral(
            &self.source.view(),
            &mut self.bilateral,
            self.params.bilateral_radius,
            &self.params.bilateral,
        );
    }

    /// Bilinear upsample of the current gauss grid into the restored grid.
    pub fn run_restore(&mut self) {
        upsample_bilinear(&self.gauss.view(), &mut self.restored);
    }

    /// Final stage: fast Gaussian, restore, then the residual-weighted
    /// resample into the downsampled grid.
    ///
    /// Returns the number of fallback pixels.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(src = ?self.src_dims(), dst = ?self.dst_dims()))
    )]
    pub fn run_downsample(&mut self) -> Result<usize, DownsampleError> {
        self.run_gauss_fast();
        self.run_restore();
        let fallbacks = residual_downsample(
            &self.source.view(),
            &self.restored.view(),
            &mut self.downsampled,
            &self.residual_kernel,
            &mut self.scratch,
            self.params.degenerate_policy,
        )?;
        if fallbacks > 0 {
            debug!(
                "{} of {} destination pixels used the plain gaussian fallback",
                fallbacks,
                self.downsampled.data.len()
            );
        }
        Ok(fallbacks)
    }

    /// Run every stage in order: subsample, reference Gaussian, bilateral,
    /// final downsample. The first three are skipped when
    /// [`DownsampleParams::final_only`] is set.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(src = ?self.src_dims(), dst = ?self.dst_dims()))
    )]
    pub fn run_all(&mut self) -> Result<DownsampleStats, DownsampleError> {
        let mut stats = DownsampleStats::default();

        if !self.params.final_only {
            let t = Instant::now();
            self.run_subsample();
            stats.subsample_ms = Some(elapsed_ms(t));

            let t = Instant::now();
            self.run_gauss_slow();
            stats.gauss_reference_ms = Some(elapsed_ms(t));

            let t = Instant::now();
            self.run_bilateral();
            stats.bilateral_ms = Some(elapsed_ms(t));
        }

        let t = Instant::now();
        stats.fallback_pixels = self.run_downsample()?;
        stats.final_ms = elapsed_ms(t);

        debug!(
            "stages done: subsample={:?}ms gauss={:?}ms bilateral={:?}ms final={:.2}ms",
            stats.subsample_ms, stats.gauss_reference_ms, stats.bilateral_ms, stats.final_ms
        );
        Ok(stats)
    }
}

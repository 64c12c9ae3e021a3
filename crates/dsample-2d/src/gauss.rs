//! Gaussian resampling from source to destination resolution.
//!
//! Every destination pixel is the normalized Gaussian average of the source
//! window around its floor-mapped center. Two implementations:
//! - [`gauss_slow`]: walks the full `[-R, R]²` window with early exits at the
//!   borders and evaluates `exp` for every sample;
//! - [`gauss_fast`]: clips the window once per row/column and reads weights
//!   from the kernel table.
//!
//! Both accumulate in the same order (rows top to bottom, columns left to
//! right), so their outputs agree to well within `1e-5`.

use dsample_core::{map_floor, FloatGrid, FloatGridView, GaussianKernel, WindowRange};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Default radius of the plain Gaussian stage.
pub const GAUSS_RADIUS: usize = 5;
/// Default sigma of the plain Gaussian stage (in radius-normalized units).
pub const GAUSS_SIGMA: f32 = 0.2;

/// Reference Gaussian pass, recomputing every weight.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(src = ?src.dims(), dst = ?dst.dims(), radius = kernel.radius()))
)]
pub fn gauss_slow(src: &FloatGridView<'_>, dst: &mut FloatGrid, kernel: &GaussianKernel) {
    let (dst_w, dst_h) = dst.dims();
    let r = kernel.radius() as isize;
    let src_w = src.width as isize;
    let src_h = src.height as isize;

    for cy in 0..dst_h {
        let cy_src = map_floor(cy, src.height, dst_h) as isize;
        for cx in 0..dst_w {
            let cx_src = map_floor(cx, src.width, dst_w) as isize;

            let mut sum = 0.0f32;
            let mut sum_weights = 0.0f32;
            for dy in -r..=r {
                let y = cy_src + dy;
                if y < 0 {
                    continue;
                }
                if y >= src_h {
                    break;
                }
                let ty = kernel.normalized(dy);
                for dx in -r..=r {
                    let x = cx_src + dx;
                    if x < 0 {
                        continue;
                    }
                    if x >= src_w {
                        break;
                    }
                    let tx = kernel.normalized(dx);
                    let w = kernel.eval_normalized(tx, ty);
                    let v = src.get(x as usize, y as usize);
                    sum += v * w;
                    sum_weights += w;
                }
            }
            dst.data[cx + cy * dst_w] = sum / sum_weights;
        }
    }
}

/// Table-driven Gaussian pass.
///
/// The horizontal windows are identical for every destination row, so they
/// are clipped once up front.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(src = ?src.dims(), dst = ?dst.dims(), radius = kernel.radius()))
)]
pub fn gauss_fast(src: &FloatGridView<'_>, dst: &mut FloatGrid, kernel: &GaussianKernel) {
    let (dst_w, dst_h) = dst.dims();
    let r = kernel.radius();
    let columns: Vec<WindowRange> = (0..dst_w)
        .map(|cx| WindowRange::new(map_floor(cx, src.width, dst_w), r, src.width))
        .collect();

    for cy in 0..dst_h {
        let rows = WindowRange::new(map_floor(cy, src.height, dst_h), r, src.height);
        let out = &mut dst.data[cy * dst_w..(cy + 1) * dst_w];
        for (v_out, cols) in out.iter_mut().zip(&columns) {
            let mut sum = 0.0f32;
            let mut sum_weights = 0.0f32;
            for (y, ky) in rows.coords().zip(rows.kernel_coords()) {
                let samples = &src.row(y)[cols.coords()];
                let weights = &kernel.row(ky)[cols.kernel_coords()];
                for (&v, &w) in samples.iter().zip(weights) {
                    sum += v * w;
                    sum_weights += w;
                }
            }
            *v_out = sum / sum_weights;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> FloatGrid {
        let mut g = FloatGrid::try_new(w, h).expect("grid");
        for y in 0..h {
            for x in 0..w {
                g.data[x + y * w] = ((x * 7 + y * 13) % 256) as f32 / 255.0;
            }
        }
        g
    }

    #[test]
    fn constant_image_stays_constant() {
        let mut src = FloatGrid::try_new(40, 30).expect("src");
        src.data.fill(0.4);
        let kernel = GaussianKernel::new(GAUSS_RADIUS, GAUSS_SIGMA);
        let mut slow = FloatGrid::try_new(13, 11).expect("dst");
        let mut fast = FloatGrid::try_new(13, 11).expect("dst");
        gauss_slow(&src.view(), &mut slow, &kernel);
        gauss_fast(&src.view(), &mut fast, &kernel);
        for (&a, &b) in slow.data.iter().zip(&fast.data) {
            assert!((a - 0.4).abs() < 1e-5);
            assert!((b - 0.4).abs() < 1e-5);
        }
    }

    #[test]
    fn fast_matches_slow_on_every_pixel() {
        let src = ramp(97, 61);
        for radius in [1, 3, GAUSS_RADIUS, 8] {
            let kernel = GaussianKernel::new(radius, GAUSS_SIGMA);
            for (dw, dh) in [(34, 21), (97, 61), (150, 90), (1, 1)] {
                let mut slow = FloatGrid::try_new(dw, dh).expect("dst");
                let mut fast = FloatGrid::try_new(dw, dh).expect("dst");
                gauss_slow(&src.view(), &mut slow, &kernel);
                gauss_fast(&src.view(), &mut fast, &kernel);
                for (i, (&a, &b)) in slow.data.iter().zip(&fast.data).enumerate() {
                    assert!(
                        (a - b).abs() < 1e-5,
                        "radius {radius}, {dw}x{dh}, pixel {i}: slow {a} fast {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn window_larger_than_source_is_truncated() {
        let src = ramp(3, 2);
        let kernel = GaussianKernel::new(8, 0.5);
        let mut slow = FloatGrid::try_new(2, 2).expect("dst");
        let mut fast = FloatGrid::try_new(2, 2).expect("dst");
        gauss_slow(&src.view(), &mut slow, &kernel);
        gauss_fast(&src.view(), &mut fast, &kernel);
        assert!(slow.data.iter().all(|v| v.is_finite()));
        assert_eq!(slow, fast);
    }

    #[test]
    fn fast_pass_is_repeatable() {
        let src = ramp(64, 64);
        let kernel = GaussianKernel::new(GAUSS_RADIUS, GAUSS_SIGMA);
        let mut first = FloatGrid::try_new(22, 22).expect("dst");
        let mut second = FloatGrid::try_new(22, 22).expect("dst");
        gauss_fast(&src.view(), &mut first, &kernel);
        gauss_fast(&src.view(), &mut second, &kernel);
        assert_eq!(first, second);
    }
}

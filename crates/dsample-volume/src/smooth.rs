use dsample_core::WindowRange;
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Volume, VolumeError, VolumeGaussParams, VolumeKernel, VolumeView};

/// Clamp to 255 and truncate.
#[inline]
fn quantize(v: f32) -> u8 {
    v.min(255.0) as u8
}

fn check_dims(src: &VolumeView<'_>, dst: &Volume) -> Result<(), VolumeError> {
    if src.dims() != dst.dims() || dst.data.len() != src.data.len() {
        return Err(VolumeError::DimensionMismatch {
            expected: src.dims(),
            got: dst.dims(),
        });
    }
    Ok(())
}

/// Reference smoothing pass: walks the full window with early exits at the
/// borders and evaluates every weight.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(dims = ?src.dims(), radius = kernel.radius()))
)]
pub fn gauss_smooth_slow_into(
    src: &VolumeView<'_>,
    dst: &mut Volume,
    kernel: &VolumeKernel,
) -> Result<(), VolumeError> {
    check_dims(src, dst)?;
    let r = kernel.radius() as isize;
    let (w, h, d) = src.dims();

    for cz in 0..d {
        for cy in 0..h {
            for cx in 0..w {
                let mut sum = 0.0f32;
                let mut sum_weights = 0.0f32;
                for dz in -r..=r {
                    let z = cz as isize + dz;
                    if z < 0 {
                        continue;
                    }
                    if z >= d as isize {
                        break;
                    }
                    for dy in -r..=r {
                        let y = cy as isize + dy;
                        if y < 0 {
                            continue;
                        }
                        if y >= h as isize {
                            break;
                        }
                        for dx in -r..=r {
                            let x = cx as isize + dx;
                            if x < 0 {
                                continue;
                            }
                            if x >= w as isize {
                                break;
                            }
                            let weight = kernel.eval(dx, dy, dz);
                            let v = src.get(x as usize, y as usize, z as usize);
                            sum += v as f32 * weight;
                            sum_weights += weight;
                        }
                    }
                }
                dst.data[cx + (cy + cz * h) * w] = quantize(sum / sum_weights);
            }
        }
    }
    Ok(())
}

/// Table-driven smoothing pass.
///
/// Per-axis windows are clipped once; accumulation order matches
/// [`gauss_smooth_slow_into`], so the output is byte-identical.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(dims = ?src.dims(), radius = kernel.radius()))
)]
pub fn gauss_smooth_fast_into(
    src: &VolumeView<'_>,
    dst: &mut Volume,
    kernel: &VolumeKernel,
) -> Result<(), VolumeError> {
    check_dims(src, dst)?;
    let r = kernel.radius();
    let (w, h, d) = src.dims();
    let columns: Vec<WindowRange> = (0..w).map(|cx| WindowRange::new(cx, r, w)).collect();
    let rows: Vec<WindowRange> = (0..h).map(|cy| WindowRange::new(cy, r, h)).collect();

    for cz in 0..d {
        let slices = WindowRange::new(cz, r, d);
        for (cy, ys) in rows.iter().enumerate() {
            let start = (cy + cz * h) * w;
            let out = &mut dst.data[start..start + w];
            for (v_out, xs) in out.iter_mut().zip(&columns) {
                let mut sum = 0.0f32;
                let mut sum_weights = 0.0f32;
                for (z, kz) in slices.coords().zip(slices.kernel_coords()) {
                    for (y, ky) in ys.coords().zip(ys.kernel_coords()) {
                        let samples = &src.row(y, z)[xs.coords()];
                        let weights = &kernel.row(ky, kz)[xs.kernel_coords()];
                        for (&v, &weight) in samples.iter().zip(weights) {
                            sum += v as f32 * weight;
                            sum_weights += weight;
                        }
                    }
                }
                *v_out = quantize(sum / sum_weights);
            }
        }
    }
    Ok(())
}

fn smooth_with(
    src: &[u8],
    width: usize,
    height: usize,
    depth: usize,
    params: VolumeGaussParams,
    pass: fn(&VolumeView<'_>, &mut Volume, &VolumeKernel) -> Result<(), VolumeError>,
) -> Result<Vec<u8>, VolumeError> {
    let view = VolumeView::new(src, width, height, depth)?;
    let kernel = VolumeKernel::new(params)?;
    let mut dst = Volume::try_new(width, height, depth)?;
    pass(&view, &mut dst, &kernel)?;
    Ok(dst.into_vec())
}

/// Reference smoothing of a `width x height x depth` volume with the default
/// radius 1 and sigma 0.8.
pub fn volume_gauss_slow(
    src: &[u8],
    width: usize,
    height: usize,
    depth: usize,
) -> Result<Vec<u8>, VolumeError> {
    volume_gauss_slow_with(src, width, height, depth, VolumeGaussParams::default())
}

/// Table-driven smoothing with the default parameters; byte-identical to
/// [`volume_gauss_slow`].
pub fn volume_gauss_fast(
    src: &[u8],
    width: usize,
    height: usize,
    depth: usize,
) -> Result<Vec<u8>, VolumeError> {
    volume_gauss_fast_with(src, width, height, depth, VolumeGaussParams::default())
}

pub fn volume_gauss_slow_with(
    src: &[u8],
    width: usize,
    height: usize,
    depth: usize,
    params: VolumeGaussParams,
) -> Result<Vec<u8>, VolumeError> {
    debug!("reference volume smoothing {width}x{height}x{depth}, {params:?}");
    smooth_with(src, width, height, depth, params, gauss_smooth_slow_into)
}

pub fn volume_gauss_fast_with(
    src: &[u8],
    width: usize,
    height: usize,
    depth: usize,
    params: VolumeGaussParams,
) -> Result<Vec<u8>, VolumeError> {
    debug!("table volume smoothing {width}x{height}x{depth}, {params:?}");
    smooth_with(src, width, height, depth, params, gauss_smooth_fast_into)
}

use dsample_core::{gaussian_rate, map_floor, FloatGrid, FloatGridView, GaussianKernel, WindowRange};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Window radius of the bilateral stage.
pub const BILATERAL_RADIUS: usize = 8;

/// Falloff of the bilateral filter. More sigma means more blurring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BilateralParams {
    /// Spatial spread, in radius-normalized units.
    pub sigma_pos: f32,
    /// Intensity spread, in `[0, 1]` intensity units.
    pub sigma_val: f32,
}

impl Default for BilateralParams {
    fn default() -> Self {
        Self {
            sigma_pos: 0.10,
            sigma_val: 0.51,
        }
    }
}

/// Edge-preserving resample: each neighbour is weighted by its spatial
/// Gaussian weight times `exp(-(v - v_center)² k_val)`, where `v_center` is
/// the source sample at the floor-mapped center.
///
/// The parameters are read once at the start of the pass.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(src = ?src.dims(), dst = ?dst.dims(), radius = radius))
)]
pub fn bilateral(
    src: &FloatGridView<'_>,
    dst: &mut FloatGrid,
    radius: usize,
    params: &BilateralParams,
) {
    let spatial = GaussianKernel::new(radius, params.sigma_pos);
    let val_rate = gaussian_rate(params.sigma_val, 2.0);
    let (dst_w, dst_h) = dst.dims();

    for cy in 0..dst_h {
        let cy_src = map_floor(cy, src.height, dst_h);
        let rows = WindowRange::new(cy_src, radius, src.height);
        for cx in 0..dst_w {
            let cx_src = map_floor(cx, src.width, dst_w);
            let cols = WindowRange::new(cx_src, radius, src.width);
            let center = src.get(cx_src, cy_src);

            let mut sum = 0.0f32;
            let mut sum_weights = 0.0f32;
            for (y, ky) in rows.coords().zip(rows.kernel_coords()) {
                let samples = &src.row(y)[cols.coords()];
                let weights = &spatial.row(ky)[cols.kernel_coords()];
                for (&v, &pos_weight) in samples.iter().zip(weights) {
                    let delta = v - center;
                    let val_weight = (-delta * delta * val_rate).exp();
                    sum += v * pos_weight * val_weight;
                    sum_weights += pos_weight * val_weight;
                }
            }
            dst.data[cx + cy * dst_w] = sum / sum_weights;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Left half dark, right half bright, vertical edge at `edge_x`.
    fn step_edge(w: usize, h: usize, edge_x: usize) -> FloatGrid {
        let mut g = FloatGrid::try_new(w, h).expect("grid");
        for y in 0..h {
            for x in 0..w {
                g.data[x + y * w] = if x < edge_x { 0.1 } else { 0.9 };
            }
        }
        g
    }

    #[test]
    fn preserves_a_step_edge_better_than_plain_gaussian() {
        let src = step_edge(64, 16, 32);
        let params = BilateralParams {
            sigma_pos: 0.5,
            sigma_val: 0.1,
        };
        let mut bila = FloatGrid::try_new(64, 16).expect("dst");
        bilateral(&src.view(), &mut bila, BILATERAL_RADIUS, &params);

        let mut plain = FloatGrid::try_new(64, 16).expect("dst");
        crate::gauss_fast(
            &src.view(),
            &mut plain,
            &GaussianKernel::new(BILATERAL_RADIUS, 0.5),
        );

        // pixel just left of the edge
        let b = bila.get(31, 8);
        let p = plain.get(31, 8);
        assert!((b - 0.1).abs() < (p - 0.1).abs(), "bilateral {b} gauss {p}");
        assert!((b - 0.1).abs() < 0.05);
    }

    #[test]
    fn huge_value_sigma_degrades_to_spatial_gaussian() {
        let src = step_edge(40, 12, 17);
        let params = BilateralParams {
            sigma_pos: 0.3,
            sigma_val: 1.0e4,
        };
        let mut bila = FloatGrid::try_new(20, 6).expect("dst");
        bilateral(&src.view(), &mut bila, 4, &params);

        let mut plain = FloatGrid::try_new(20, 6).expect("dst");
        crate::gauss_slow(&src.view(), &mut plain, &GaussianKernel::new(4, 0.3));

        for (&a, &b) in bila.data.iter().zip(&plain.data) {
            assert!((a - b).abs() < 1e-5, "bilateral {a} gauss {b}");
        }
    }

    #[test]
    fn defaults_match_demo_values() {
        let p = BilateralParams::default();
        assert_eq!(p.sigma_pos, 0.10);
        assert_eq!(p.sigma_val, 0.51);
    }
}

use dsample_core::{sample_bilinear_clamped, FloatGrid, FloatGridView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Bilinear upsample of a small grid back to a larger resolution.
///
/// Target pixel `(x, y)` samples the small grid at
/// `(small_w * x / large_w, small_h * y / large_h)`, computed in `f32`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(small = ?small.dims(), large = ?large.dims()))
)]
pub fn upsample_bilinear(small: &FloatGridView<'_>, large: &mut FloatGrid) {
    let (large_w, large_h) = large.dims();
    let small_w = small.width as f32;
    let small_h = small.height as f32;

    for y in 0..large_h {
        let ys = small_h * y as f32 / large_h as f32;
        let out = &mut large.data[y * large_w..(y + 1) * large_w];
        for (x, v) in out.iter_mut().enumerate() {
            let xs = small_w * x as f32 / large_w as f32;
            *v = sample_bilinear_clamped(small, xs, ys);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn doubles_a_tiny_grid() {
        let small = FloatGrid {
            width: 2,
            height: 2,
            data: vec![0.0, 1.0, 1.0, 0.0],
        };
        let mut large = FloatGrid::try_new(4, 4).expect("large");
        upsample_bilinear(&small.view(), &mut large);

        assert_relative_eq!(large.get(0, 0), 0.0);
        assert_relative_eq!(large.get(1, 0), 0.5);
        assert_relative_eq!(large.get(2, 0), 1.0);
        // last column clamps onto itself
        assert_relative_eq!(large.get(3, 0), 1.0);
        assert_relative_eq!(large.get(1, 1), 0.5);
        assert_relative_eq!(large.get(2, 2), 0.0);
    }

    #[test]
    fn same_size_is_identity() {
        let small = FloatGrid {
            width: 3,
            height: 2,
            data: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        };
        let mut large = FloatGrid::try_new(3, 2).expect("large");
        upsample_bilinear(&small.view(), &mut large);
        assert_eq!(large, small);
    }
}

use dsample_core::{map_floor, FloatGrid, FloatGridView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Nearest-neighbour resample: every destination pixel copies the source
/// sample at the floor-mapped coordinate. No filtering.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(src = ?src.dims(), dst = ?dst.dims()))
)]
pub fn subsample(src: &FloatGridView<'_>, dst: &mut FloatGrid) {
    let (dst_w, dst_h) = dst.dims();
    for cy in 0..dst_h {
        let row = src.row(map_floor(cy, src.height, dst_h));
        let out = &mut dst.data[cy * dst_w..(cy + 1) * dst_w];
        for (cx, v) in out.iter_mut().enumerate() {
            *v = row[map_floor(cx, src.width, dst_w)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_floor_mapped_samples() {
        let src = FloatGrid {
            width: 4,
            height: 2,
            data: vec![0.0, 0.1, 0.2, 0.3, 1.0, 1.1, 1.2, 1.3],
        };
        let mut dst = FloatGrid::try_new(2, 1).expect("dst");
        subsample(&src.view(), &mut dst);
        assert_eq!(dst.data, vec![0.0, 0.2]);
    }

    #[test]
    fn upsampling_repeats_samples() {
        let src = FloatGrid {
            width: 2,
            height: 1,
            data: vec![0.25, 0.75],
        };
        let mut dst = FloatGrid::try_new(4, 2).expect("dst");
        subsample(&src.view(), &mut dst);
        assert_eq!(dst.data, vec![0.25, 0.25, 0.75, 0.75, 0.25, 0.25, 0.75, 0.75]);
    }
}

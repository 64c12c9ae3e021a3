use dsample_volume::{
    gauss_smooth_fast_into, gauss_smooth_slow_into, volume_gauss_fast, volume_gauss_slow,
    Volume, VolumeGaussParams, VolumeKernel, VolumeView,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

const W: usize = 64;
const H: usize = 48;
const D: usize = 40;

const BLACK_AT: (usize, usize, usize) = (4, 4, 4);
const BRIGHT_AT: (usize, usize, usize) = (40, 24, 20);
const GREY_AT: (usize, usize, usize) = (12, 36, 30);

fn idx(x: usize, y: usize, z: usize) -> usize {
    x + (y + z * H) * W
}

/// Black corner block, a saturated sphere, a grey slab and seeded noise.
fn synthetic_volume() -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x7701_3d3d);
    let mut voxels = vec![0u8; W * H * D];
    for z in 0..D {
        for y in 0..H {
            for x in 0..W {
                let (dx, dy, dz) = (
                    x as i64 - BRIGHT_AT.0 as i64,
                    y as i64 - BRIGHT_AT.1 as i64,
                    z as i64 - BRIGHT_AT.2 as i64,
                );
                voxels[idx(x, y, z)] = if dx * dx + dy * dy + dz * dz <= 36 {
                    255
                } else if x < 10 && y < 10 && z < 10 {
                    0
                } else if x < 24 && y >= 30 {
                    128
                } else {
                    rng.random_range(0..=255)
                };
            }
        }
    }
    voxels
}

fn probe_points(rng: &mut StdRng, random: usize) -> Vec<(usize, usize, usize)> {
    let mut points = vec![
        (0, 0, 0),
        (W - 1, 0, 0),
        (0, H - 1, 0),
        (0, 0, D - 1),
        (W - 1, H - 1, D - 1),
        (W / 2, 0, D / 2),
        BLACK_AT,
        BRIGHT_AT,
        GREY_AT,
    ];
    points.extend((0..random).map(|_| {
        (
            rng.random_range(0..W),
            rng.random_range(0..H),
            rng.random_range(0..D),
        )
    }));
    points
}

#[test]
fn fast_and_slow_agree_byte_for_byte() {
    let src = synthetic_volume();
    let slow = volume_gauss_slow(&src, W, H, D).expect("slow");
    let fast = volume_gauss_fast(&src, W, H, D).expect("fast");

    let mut rng = StdRng::seed_from_u64(42);
    for (x, y, z) in probe_points(&mut rng, 16) {
        assert_eq!(
            slow[idx(x, y, z)],
            fast[idx(x, y, z)],
            "voxel ({x}, {y}, {z})"
        );
    }
    assert_eq!(slow, fast);
}

#[test]
fn landmarks_keep_their_intensity() {
    let src = synthetic_volume();
    let out = volume_gauss_fast(&src, W, H, D).expect("fast");
    assert_eq!(out[idx(BLACK_AT.0, BLACK_AT.1, BLACK_AT.2)], 0);
    assert!(out[idx(BRIGHT_AT.0, BRIGHT_AT.1, BRIGHT_AT.2)] >= 254);
    let grey = out[idx(GREY_AT.0, GREY_AT.1, GREY_AT.2)];
    assert!((127..=128).contains(&grey), "grey {grey}");
}

#[test]
fn wider_kernels_stay_equivalent() {
    let src = synthetic_volume();
    let view = VolumeView::new(&src, W, H, D).expect("view");
    for params in [
        VolumeGaussParams {
            radius: 2,
            sigma: 0.8,
        },
        VolumeGaussParams {
            radius: 3,
            sigma: 1.4,
        },
    ] {
        let kernel = VolumeKernel::new(params).expect("kernel");
        let mut slow = Volume::try_new(W, H, D).expect("volume");
        let mut fast = Volume::try_new(W, H, D).expect("volume");
        gauss_smooth_slow_into(&view, &mut slow, &kernel).expect("slow");
        gauss_smooth_fast_into(&view, &mut fast, &kernel).expect("fast");
        assert_eq!(slow, fast, "{params:?}");
    }
}

#[test]
fn thin_volumes_are_handled() {
    let mut rng = StdRng::seed_from_u64(9);
    for (w, h, d) in [(1, 1, 7), (7, 1, 1), (3, 2, 1), (2, 9, 2)] {
        let src: Vec<u8> = (0..w * h * d).map(|_| rng.random_range(0..=255)).collect();
        assert_eq!(
            volume_gauss_slow(&src, w, h, d).expect("slow"),
            volume_gauss_fast(&src, w, h, d).expect("fast")
        );
    }
}

#[test]
#[cfg_attr(debug_assertions, ignore = "timing is only meaningful in optimized builds")]
fn table_pass_is_faster() {
    let src = synthetic_volume();
    let runs = 4;

    let t = Instant::now();
    for _ in 0..runs {
        volume_gauss_slow(&src, W, H, D).expect("slow");
    }
    let slow = t.elapsed().as_secs_f64();

    let t = Instant::now();
    for _ in 0..runs {
        volume_gauss_fast(&src, W, H, D).expect("fast");
    }
    let fast = t.elapsed().as_secs_f64();
    assert!(slow / fast > 2.0, "speedup only {:.2}", slow / fast);
}

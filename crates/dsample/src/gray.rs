//! `image::GrayImage` conversions and an end-to-end helper.

use std::path::Path;

use crate::{DownsampleError, DownsampleParams, DownsampleStats, Downsampler};
use dsample_core::{FloatGrid, FloatGridView, GridError};
use image::{GrayImage, ImageReader};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the grayscale image helpers.
#[derive(thiserror::Error, Debug)]
pub enum GrayImageError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: usize, height: usize },

    #[error(transparent)]
    Downsample(#[from] DownsampleError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<GridError> for GrayImageError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::InvalidDimensions { width, height } => {
                Self::InvalidGrayDimensions { width, height }
            }
            GridError::InvalidBuffer { expected, got } => Self::InvalidGrayBuffer { expected, got },
            GridError::Allocation(e) => Self::Downsample(DownsampleError::Allocation(e)),
        }
    }
}

/// Decode any supported image file and convert it to 8-bit luma.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, GrayImageError> {
    Ok(ImageReader::open(path)?.decode()?.to_luma8())
}

/// Normalize a grayscale image into a `[0, 1]` grid.
pub fn grid_from_gray(img: &GrayImage) -> Result<FloatGrid, GrayImageError> {
    Ok(FloatGrid::from_gray_u8(
        img.width() as usize,
        img.height() as usize,
        img.as_raw(),
    )?)
}

/// Quantize a grid back to an 8-bit image (`value * 255`, clamped, truncated).
pub fn gray_from_grid(grid: &FloatGridView<'_>) -> Result<GrayImage, GrayImageError> {
    let invalid = || GrayImageError::InvalidGrayDimensions {
        width: grid.width,
        height: grid.height,
    };
    let width = u32::try_from(grid.width).map_err(|_| invalid())?;
    let height = u32::try_from(grid.height).map_err(|_| invalid())?;
    let bytes = grid.to_gray_u8();
    let got = bytes.len();
    GrayImage::from_raw(width, height, bytes).ok_or(GrayImageError::InvalidGrayBuffer {
        expected: grid.width * grid.height,
        got,
    })
}

/// Write a grid as an 8-bit grayscale image; the format follows the file
/// extension.
pub fn save_gray(
    grid: &FloatGridView<'_>,
    path: impl AsRef<Path>,
) -> Result<(), GrayImageError> {
    gray_from_grid(grid)?.save(path)?;
    Ok(())
}

/// Run every stage on a decoded image and hand back the session with its
/// intermediate grids.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, params),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn downsample_gray_image(
    img: &GrayImage,
    dst_width: usize,
    dst_height: usize,
    params: DownsampleParams,
) -> Result<(Downsampler, DownsampleStats), GrayImageError> {
    let source = grid_from_gray(img)?;
    let mut session = Downsampler::from_source(source, dst_width, dst_height, params)?;
    let stats = session.run_all()?;
    Ok((session, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| image::Luma([((x * 4 + y * 2) % 256) as u8]))
    }

    #[test]
    fn gray_roundtrip_is_lossless() {
        let img = gradient(37, 21);
        let grid = grid_from_gray(&img).expect("grid");
        assert_eq!(grid.dims(), (37, 21));
        let back = gray_from_grid(&grid.view()).expect("image");
        assert_eq!(back.as_raw(), img.as_raw());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let grid = FloatGrid {
            width: 3,
            height: 1,
            data: vec![-0.5, 0.5, 2.0],
        };
        let img = gray_from_grid(&grid.view()).expect("image");
        assert_eq!(img.as_raw(), &vec![0, 127, 255]);
    }

    #[test]
    fn end_to_end_on_an_image() {
        let img = gradient(64, 48);
        let (session, stats) =
            downsample_gray_image(&img, 22, 16, DownsampleParams::default()).expect("run");
        assert_eq!(session.downsampled().dims(), (22, 16));
        assert!(stats.final_ms >= 0.0);
    }

    #[test]
    fn empty_target_is_rejected() {
        let img = gradient(8, 8);
        assert!(matches!(
            downsample_gray_image(&img, 0, 4, DownsampleParams::default()),
            Err(GrayImageError::Downsample(
                DownsampleError::InvalidDimensions { .. }
            ))
        ));
    }

    #[test]
    fn saved_png_decodes_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grid.png");
        let grid = grid_from_gray(&gradient(10, 6)).expect("grid");
        save_gray(&grid.view(), &path).expect("save");
        let back = load_gray(&path).expect("load");
        assert_eq!(back.dimensions(), (10, 6));
        assert_eq!(back.as_raw(), gradient(10, 6).as_raw());
    }
}

use crate::GridError;

/// Scale applied to an 8-bit sample to bring it into `[0, 1]`.
pub const INV_255: f32 = 1.0 / 255.0;

#[derive(Clone, Copy, Debug)]
pub struct FloatGridView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32], // row-major, len = w*h
}

/// Owned single-channel `f32` grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatGrid {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

/// Number of samples in a `width x height` grid, rejecting empty or overflowing shapes.
fn checked_len(width: usize, height: usize) -> Result<usize, GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(GridError::InvalidDimensions { width, height })
}

impl FloatGrid {
    /// Allocate a zero-filled grid.
    ///
    /// Allocation goes through `try_reserve_exact`, so an out-of-memory
    /// condition is reported as [`GridError::Allocation`] instead of aborting.
    pub fn try_new(width: usize, height: usize) -> Result<Self, GridError> {
        let len = checked_len(width, height)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0.0);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a normalized grid from packed 32-bit pixels.
    ///
    /// Only the low byte of every pixel is used; it is scaled into `[0, 1]`.
    pub fn from_packed(width: usize, height: usize, pixels: &[u32]) -> Result<Self, GridError> {
        let mut grid = Self::try_new(width, height)?;
        if pixels.len() != grid.data.len() {
            return Err(GridError::InvalidBuffer {
                expected: grid.data.len(),
                got: pixels.len(),
            });
        }
        for (dst, &p) in grid.data.iter_mut().zip(pixels) {
            *dst = (p & 0xff) as f32 * INV_255;
        }
        Ok(grid)
    }

    /// Build a normalized grid from 8-bit grayscale samples.
    pub fn from_gray_u8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, GridError> {
        let mut grid = Self::try_new(width, height)?;
        if pixels.len() != grid.data.len() {
            return Err(GridError::InvalidBuffer {
                expected: grid.data.len(),
                got: pixels.len(),
            });
        }
        for (dst, &p) in grid.data.iter_mut().zip(pixels) {
            *dst = p as f32 * INV_255;
        }
        Ok(grid)
    }

    #[inline]
    pub fn view(&self) -> FloatGridView<'_> {
        FloatGridView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[x + y * self.width]
    }

    /// Quantize back to 8 bits (`value * 255`, clamped, truncated).
    pub fn to_gray_u8(&self) -> Vec<u8> {
        self.view().to_gray_u8()
    }
}

impl<'a> FloatGridView<'a> {
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[x + y * self.width]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &'a [f32] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    /// Quantize back to 8 bits (`value * 255`, clamped, truncated).
    pub fn to_gray_u8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v * 255.0).clamp(0.0, 255.0) as u8)
            .collect()
    }
}

/// Bilinear sample at a non-negative position, clamping the `+1` neighbours
/// to the last row/column.
///
/// Neighbours are blended column-first:
///
/// ```text
/// A B
/// C D
/// ```
///
/// `left = A(1-ty) + C ty`, `right = B(1-ty) + D ty`, `left(1-tx) + right tx`.
#[inline]
pub fn sample_bilinear_clamped(src: &FloatGridView<'_>, x: f32, y: f32) -> f32 {
    let x0 = (x as usize).min(src.width - 1);
    let y0 = (y as usize).min(src.height - 1);
    let tx = x - x0 as f32;
    let ty = y - y0 as f32;
    let x1 = if x0 + 1 < src.width { x0 + 1 } else { src.width - 1 };
    let y1 = if y0 + 1 < src.height {
        y0 + 1
    } else {
        src.height - 1
    };

    let a = src.get(x0, y0);
    let b = src.get(x1, y0);
    let c = src.get(x0, y1);
    let d = src.get(x1, y1);

    let left = a * (1.0 - ty) + c * ty;
    let right = b * (1.0 - ty) + d * ty;
    left * (1.0 - tx) + right * tx
}

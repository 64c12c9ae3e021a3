use crate::VolumeError;

/// Borrowed 8-bit volume, x fastest then y then z.
#[derive(Clone, Copy, Debug)]
pub struct VolumeView<'a> {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub data: &'a [u8],
}

/// Owned 8-bit volume, x fastest then y then z.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Volume {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub data: Vec<u8>,
}

fn checked_len(width: usize, height: usize, depth: usize) -> Result<usize, VolumeError> {
    let invalid = VolumeError::InvalidDimensions {
        width,
        height,
        depth,
    };
    if width == 0 || height == 0 || depth == 0 {
        return Err(invalid);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(depth))
        .ok_or(invalid)
}

impl<'a> VolumeView<'a> {
    /// Wrap a voxel slice, checking its length against the dimensions.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        depth: usize,
    ) -> Result<Self, VolumeError> {
        let len = checked_len(width, height, depth)?;
        if data.len() != len {
            return Err(VolumeError::InvalidBuffer {
                expected: len,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.data[x + (y + z * self.height) * self.width]
    }

    /// Voxels of row `y` in slice `z`.
    #[inline]
    pub fn row(&self, y: usize, z: usize) -> &'a [u8] {
        let start = (y + z * self.height) * self.width;
        &self.data[start..start + self.width]
    }
}

impl Volume {
    /// Allocate a zero-filled volume.
    pub fn try_new(width: usize, height: usize, depth: usize) -> Result<Self, VolumeError> {
        let len = checked_len(width, height, depth)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);
        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    /// Take ownership of a voxel buffer.
    pub fn from_vec(
        width: usize,
        height: usize,
        depth: usize,
        data: Vec<u8>,
    ) -> Result<Self, VolumeError> {
        VolumeView::new(&data, width, height, depth)?;
        Ok(Self {
            width,
            height,
            depth,
            data,
        })
    }

    #[inline]
    pub fn view(&self) -> VolumeView<'_> {
        VolumeView {
            width: self.width,
            height: self.height,
            depth: self.depth,
            data: &self.data,
        }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> u8 {
        self.view().get(x, y, z)
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

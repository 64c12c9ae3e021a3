//! Coordinate mapping and border-truncated filter windows.

use std::ops::Range;

/// Map a destination coordinate onto the source axis with integer floor
/// division: `src_dim * dst_coord / dst_dim`.
///
/// Works for both down- and up-sampling ratios.
#[inline]
pub fn map_floor(dst_coord: usize, src_dim: usize, dst_dim: usize) -> usize {
    src_dim * dst_coord / dst_dim
}

/// The part of a `[center - radius, center + radius]` window that lies
/// inside `[0, dim)`.
///
/// Samples past either border are dropped, never clamped or mirrored, so the
/// window shrinks (asymmetrically) near an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowRange {
    pub center: usize,
    pub radius: usize,
    /// First in-grid coordinate (inclusive).
    pub start: usize,
    /// One past the last in-grid coordinate.
    pub end: usize,
}

impl WindowRange {
    #[inline]
    pub fn new(center: usize, radius: usize, dim: usize) -> Self {
        let start = center.saturating_sub(radius);
        let end = center.saturating_add(radius + 1).min(dim);
        Self {
            center,
            radius,
            start,
            end: end.max(start),
        }
    }

    #[inline]
    pub fn coords(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Kernel column/row (`offset + radius`) of the first in-grid coordinate.
    #[inline]
    pub fn kernel_start(&self) -> usize {
        self.start + self.radius - self.center
    }

    /// Kernel columns/rows covered by the in-grid part of the window.
    #[inline]
    pub fn kernel_coords(&self) -> Range<usize> {
        let k0 = self.kernel_start();
        k0..k0 + self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_mapping_truncates() {
        // 0.35x: 512 -> 179
        assert_eq!(map_floor(0, 512, 179), 0);
        assert_eq!(map_floor(22, 512, 179), 62);
        assert_eq!(map_floor(178, 512, 179), 509);
        // upsampling keeps every destination inside the source
        assert_eq!(map_floor(9, 4, 10), 3);
    }

    #[test]
    fn interior_window_is_symmetric() {
        let w = WindowRange::new(10, 3, 100);
        assert_eq!(w.coords(), 7..14);
        assert_eq!(w.kernel_coords(), 0..7);
    }

    #[test]
    fn border_windows_are_truncated() {
        let left = WindowRange::new(1, 5, 20);
        assert_eq!(left.coords(), 0..7);
        assert_eq!(left.kernel_coords(), 4..11);

        let right = WindowRange::new(18, 5, 20);
        assert_eq!(right.coords(), 13..20);
        assert_eq!(right.kernel_coords(), 0..7);

        let tiny = WindowRange::new(0, 8, 1);
        assert_eq!(tiny.coords(), 0..1);
        assert_eq!(tiny.kernel_coords(), 8..9);
    }
}

use serde::{Deserialize, Serialize};

use crate::error::{BlitError, Result};
use crate::point::BYTES_PER_PIXEL;

/// Largest width or height a canvas may have; coordinates travel as `u16`.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(BlitError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Bytes in one image row.
    pub fn row_stride(&self) -> u64 {
        self.width as u64 * BYTES_PER_PIXEL
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Bytes in a complete source file for this geometry.
    pub fn byte_len(&self) -> u64 {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    /// Map the global byte offset of a triplet to its pixel coordinate.
    /// `offset` must be a multiple of 3.
    pub fn coordinate_of(&self, offset: u64) -> (u16, u16) {
        let idx = offset / BYTES_PER_PIXEL;
        let x = idx % self.width as u64;
        let y = idx / self.width as u64;
        (x as u16, y as u16)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        (x as u32) < self.width && (y as u32) < self.height
    }

    /// Row-major pixel index of an in-bounds coordinate.
    pub fn index_of(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_of() {
        let g = Geometry::new(4, 3).unwrap();
        assert_eq!(g.coordinate_of(0), (0, 0));
        assert_eq!(g.coordinate_of(9), (3, 0));
        assert_eq!(g.coordinate_of(12), (0, 1));
        assert_eq!(g.coordinate_of(33), (3, 2));
    }

    #[test]
    fn test_rejects_zero_and_oversized() {
        assert!(Geometry::new(0, 5).is_err());
        assert!(Geometry::new(5, 0).is_err());
        assert!(Geometry::new(MAX_DIMENSION + 1, 1).is_err());
        assert!(Geometry::new(MAX_DIMENSION, 1).is_ok());
    }

    #[test]
    fn test_sizes() {
        let g = Geometry::new(400, 400).unwrap();
        assert_eq!(g.row_stride(), 1200);
        assert_eq!(g.pixel_count(), 160_000);
        assert_eq!(g.byte_len(), 480_000);
    }
}

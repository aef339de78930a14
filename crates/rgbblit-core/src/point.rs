use serde::{Deserialize, Serialize};

use crate::error::{BlitError, Result};

/// Bytes per pixel in the source file.
pub const BYTES_PER_PIXEL: u64 = 3;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a 3-byte triplet. Panics if `bytes` is shorter than 3.
    pub fn from_triplet(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Apply `f` to each channel.
    pub fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }
}

/// One pixel on its way from a worker to the renderer. Self-describing:
/// it carries its own coordinate so arrival order does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u16,
    pub y: u16,
    pub color: Rgb,
}

impl PixelPoint {
    /// Encoded record size: `x:u16, y:u16, r:u8, g:u8, b:u8`, little-endian, packed.
    pub const WIRE_SIZE: usize = 7;

    pub fn new(x: u16, y: u16, color: Rgb) -> Self {
        Self { x, y, color }
    }

    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let x = self.x.to_le_bytes();
        let y = self.y.to_le_bytes();
        [x[0], x[1], y[0], y[1], self.color.r, self.color.g, self.color.b]
    }

    pub fn decode(record: &[u8]) -> Result<Self> {
        if record.len() < Self::WIRE_SIZE {
            return Err(BlitError::TruncatedRecord {
                got: record.len(),
                expected: Self::WIRE_SIZE,
            });
        }
        Ok(Self {
            x: u16::from_le_bytes([record[0], record[1]]),
            y: u16::from_le_bytes([record[2], record[3]]),
            color: Rgb::from_triplet(&record[4..7]),
        })
    }
}

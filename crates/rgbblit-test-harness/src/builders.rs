use std::path::{Path, PathBuf};

use rgbblit_core::point::Rgb;

use crate::fixtures::write_raw_rgb;

enum Fill {
    Solid(Rgb),
    Gradient,
    Pattern,
}

/// Builder for raw RGB test images with sensible defaults.
pub struct RawImageBuilder {
    width: u32,
    height: u32,
    fill: Fill,
}

impl RawImageBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fill: Fill::Pattern,
        }
    }

    pub fn solid(mut self, color: Rgb) -> Self {
        self.fill = Fill::Solid(color);
        self
    }

    /// Red ramps along x, green along y, blue fixed.
    pub fn gradient(mut self) -> Self {
        self.fill = Fill::Gradient;
        self
    }

    /// Every pixel distinct for small images, none of them gray.
    pub fn pattern(mut self) -> Self {
        self.fill = Fill::Pattern;
        self
    }

    pub fn color_at(&self, x: u32, y: u32) -> Rgb {
        match self.fill {
            Fill::Solid(color) => color,
            Fill::Gradient => {
                let ramp = |v: u32, n: u32| (v * 255 / n.saturating_sub(1).max(1)) as u8;
                Rgb::new(ramp(x, self.width), ramp(y, self.height), 128)
            }
            Fill::Pattern => {
                let i = (y * self.width + x) as u8;
                Rgb::new(
                    i.wrapping_mul(7),
                    i.wrapping_mul(13).wrapping_add(40),
                    200u8.wrapping_sub(i),
                )
            }
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 3) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.color_at(x, y);
                bytes.extend_from_slice(&[c.r, c.g, c.b]);
            }
        }
        bytes
    }

    /// Build and write to `<dir>/<name>.rgb`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        write_raw_rgb(dir, name, &self.build())
    }
}

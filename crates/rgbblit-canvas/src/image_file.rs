use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use log::{debug, info};
use rgbblit_core::canvas::{Canvas, Raster};
use rgbblit_core::geometry::Geometry;
use rgbblit_core::point::Rgb;

use crate::error::{CanvasError, Result};

/// Paints into memory and writes an image file when closed. The format
/// follows the file extension (`.png`, `.ppm`, `.pnm`). A discarded canvas
/// leaves no file behind.
pub struct ImageFileCanvas {
    path: PathBuf,
    format: Option<ImageFormat>,
    raster: Option<Raster>,
}

impl ImageFileCanvas {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: None,
            raster: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_for(path: &Path) -> Result<ImageFormat> {
        match ImageFormat::from_path(path) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Pnm)) => Ok(format),
            _ => Err(CanvasError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn raster_mut(&mut self) -> Result<&mut Raster> {
        self.raster.as_mut().ok_or(CanvasError::NotOpen)
    }

    fn write_image(&self, raster: &Raster, format: ImageFormat) -> Result<()> {
        let geometry = raster.geometry();
        let bytes = raster.as_bytes();
        let image = RgbImage::from_raw(geometry.width, geometry.height, bytes.to_vec()).ok_or(
            CanvasError::BufferMismatch {
                len: bytes.len(),
                width: geometry.width,
                height: geometry.height,
            },
        )?;
        image
            .save_with_format(&self.path, format)
            .map_err(|source| CanvasError::Encode {
                path: self.path.clone(),
                source,
            })
    }

    /// Remove the file created by `open`.
    fn remove_placeholder(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CanvasError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Canvas for ImageFileCanvas {
    fn open(&mut self, geometry: Geometry) -> rgbblit_core::error::Result<()> {
        let format = Self::format_for(&self.path)?;
        // Fail now rather than after every worker has run.
        File::create(&self.path).map_err(|source| CanvasError::Create {
            path: self.path.clone(),
            source,
        })?;
        self.format = Some(format);
        self.raster = Some(Raster::new(geometry));
        debug!(
            "image canvas {}x{} -> {}",
            geometry.width,
            geometry.height,
            self.path.display()
        );
        Ok(())
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) -> rgbblit_core::error::Result<()> {
        self.raster_mut()?.set_pixel(x, y, color)
    }

    fn flush(&mut self) -> rgbblit_core::error::Result<()> {
        self.raster_mut()?;
        Ok(())
    }

    fn close(&mut self) -> rgbblit_core::error::Result<()> {
        let (Some(raster), Some(format)) = (self.raster.take(), self.format.take()) else {
            return Ok(());
        };
        if let Err(e) = self.write_image(&raster, format) {
            if let Err(remove_err) = self.remove_placeholder() {
                debug!("{remove_err}");
            }
            return Err(e.into());
        }
        info!("wrote {}", self.path.display());
        Ok(())
    }

    fn discard(&mut self) -> rgbblit_core::error::Result<()> {
        self.format = None;
        if self.raster.take().is_none() {
            return Ok(());
        }
        self.remove_placeholder()?;
        debug!("discarded {}", self.path.display());
        Ok(())
    }
}

use crate::error::{BlitError, Result};
use crate::geometry::Geometry;
use crate::point::{BYTES_PER_PIXEL, Rgb};

// =============================================================================
// Raster
// =============================================================================

/// An owned RGB pixel buffer. 3 bytes per pixel, row-major, starts black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    geometry: Geometry,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            data: vec![0u8; geometry.byte_len() as usize],
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Color at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb> {
        if !self.geometry.contains(x, y) {
            return None;
        }
        let i = self.geometry.index_of(x, y) * BYTES_PER_PIXEL as usize;
        Some(Rgb::from_triplet(&self.data[i..i + 3]))
    }

    pub fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) -> Result<()> {
        if !self.geometry.contains(x, y) {
            return Err(BlitError::PointOutOfBounds {
                x,
                y,
                width: self.geometry.width,
                height: self.geometry.height,
            });
        }
        let i = self.geometry.index_of(x, y) * BYTES_PER_PIXEL as usize;
        self.data[i..i + 3].copy_from_slice(&[color.r, color.g, color.b]);
        Ok(())
    }

    /// Raw row-major RGB bytes, same layout as the source file.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

}

// =============================================================================
// Canvas capability
// =============================================================================

/// A drawing surface owned by the renderer.
///
/// Backends are picked at startup; the renderer only sees this trait.
pub trait Canvas {
    /// Acquire the surface. Failing here aborts the run.
    fn open(&mut self, geometry: Geometry) -> Result<()>;

    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) -> Result<()>;

    /// Make everything painted so far visible.
    fn flush(&mut self) -> Result<()>;

    /// Block until the surface's close signal. Surfaces without one return at once.
    fn wait_for_close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the surface, keeping what was painted. Only called once
    /// every pixel has arrived.
    fn close(&mut self) -> Result<()>;

    /// Release the surface after a failed run. Nothing painted may outlive
    /// this call.
    fn discard(&mut self) -> Result<()>;
}

/// Headless canvas that keeps the painted raster in memory.
#[derive(Debug, Default)]
pub struct MemoryCanvas {
    raster: Option<Raster>,
    flushes: usize,
    closed: bool,
    discarded: bool,
}

impl MemoryCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// The painted raster, if the canvas was opened.
    pub fn raster(&self) -> Option<&Raster> {
        self.raster.as_ref()
    }

    pub fn into_raster(self) -> Option<Raster> {
        self.raster
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    fn raster_mut(&mut self) -> Result<&mut Raster> {
        self.raster
            .as_mut()
            .ok_or_else(|| BlitError::Canvas("canvas used before open".into()))
    }
}

impl Canvas for MemoryCanvas {
    fn open(&mut self, geometry: Geometry) -> Result<()> {
        self.raster = Some(Raster::new(geometry));
        self.closed = false;
        self.discarded = false;
        Ok(())
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb) -> Result<()> {
        self.raster_mut()?.set_pixel(x, y, color)
    }

    fn flush(&mut self) -> Result<()> {
        self.raster_mut()?;
        self.flushes += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn discard(&mut self) -> Result<()> {
        self.raster = None;
        self.closed = true;
        self.discarded = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_starts_black() {
        let raster = Raster::new(Geometry::new(2, 2).unwrap());
        assert_eq!(raster.pixel(1, 1), Some(Rgb::default()));
        assert_eq!(raster.as_bytes().len(), 12);
    }

    #[test]
    fn test_raster_set_and_get() {
        let mut raster = Raster::new(Geometry::new(3, 2).unwrap());
        raster.set_pixel(2, 1, Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(raster.pixel(2, 1), Some(Rgb::new(1, 2, 3)));
        assert_eq!(&raster.as_bytes()[15..18], &[1, 2, 3]);
    }

    #[test]
    fn test_raster_rejects_out_of_bounds() {
        let mut raster = Raster::new(Geometry::new(2, 2).unwrap());
        assert!(raster.pixel(2, 0).is_none());
        assert!(matches!(
            raster.set_pixel(0, 2, Rgb::default()),
            Err(BlitError::PointOutOfBounds { x: 0, y: 2, .. })
        ));
    }

    #[test]
    fn test_memory_canvas_requires_open() {
        let mut canvas = MemoryCanvas::new();
        assert!(canvas.set_pixel(0, 0, Rgb::default()).is_err());
        canvas.open(Geometry::new(1, 1).unwrap()).unwrap();
        canvas.set_pixel(0, 0, Rgb::new(9, 9, 9)).unwrap();
        canvas.flush().unwrap();
        canvas.close().unwrap();
        assert!(canvas.is_closed());
        assert_eq!(canvas.flush_count(), 1);
        assert_eq!(canvas.raster().unwrap().pixel(0, 0), Some(Rgb::new(9, 9, 9)));
        assert!(!canvas.is_discarded());
    }

    #[test]
    fn test_memory_canvas_discard_drops_raster() {
        let mut canvas = MemoryCanvas::new();
        canvas.open(Geometry::new(2, 1).unwrap()).unwrap();
        canvas.set_pixel(1, 0, Rgb::new(4, 4, 4)).unwrap();
        canvas.discard().unwrap();
        assert!(canvas.is_closed());
        assert!(canvas.is_discarded());
        assert!(canvas.raster().is_none());
    }
}

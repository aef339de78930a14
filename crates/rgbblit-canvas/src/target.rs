use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rgbblit_core::canvas::{Canvas, MemoryCanvas};

use crate::error::CanvasError;
use crate::image_file::ImageFileCanvas;

/// Environment variable naming the display target.
pub const DISPLAY_ENV: &str = "RGBBLIT_DISPLAY";

pub const DEFAULT_DISPLAY: &str = "file:rgbblit.png";

/// Where the renderer paints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayTarget {
    /// Headless; the image is kept in memory and dropped at exit.
    Memory,
    /// Written to an image file when the canvas closes.
    File(PathBuf),
}

impl DisplayTarget {
    /// Pick the target: the first explicit value wins, then the environment,
    /// then [`DEFAULT_DISPLAY`].
    pub fn resolve(explicit: Option<&str>) -> Result<Self, CanvasError> {
        match explicit {
            Some(target) => target.parse(),
            None => match std::env::var(DISPLAY_ENV) {
                Ok(target) if !target.is_empty() => target.parse(),
                _ => DEFAULT_DISPLAY.parse(),
            },
        }
    }

    /// Instantiate the backend. The canvas is not opened yet.
    pub fn canvas(&self) -> Box<dyn Canvas> {
        match self {
            Self::Memory => Box::new(MemoryCanvas::new()),
            Self::File(path) => Box::new(ImageFileCanvas::new(path.clone())),
        }
    }
}

impl FromStr for DisplayTarget {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if s == "memory" => Ok(Self::Memory),
            Some(("file", path)) if !path.is_empty() => Ok(Self::File(PathBuf::from(path))),
            _ => Err(CanvasError::UnknownTarget(s.to_string())),
        }
    }
}

impl fmt::Display for DisplayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

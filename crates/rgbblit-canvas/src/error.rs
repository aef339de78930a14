use std::path::PathBuf;

use rgbblit_core::error::BlitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("unknown display target `{0}`")]
    UnknownTarget(String),

    #[error("no image format for `{}`", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("cannot create `{}`: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding `{}` failed: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cannot remove `{}`: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{len} bytes of pixel data do not fit a {width}x{height} image")]
    BufferMismatch { len: usize, width: u32, height: u32 },

    #[error("canvas used before open")]
    NotOpen,
}

pub type Result<T> = std::result::Result<T, CanvasError>;

impl From<CanvasError> for BlitError {
    fn from(e: CanvasError) -> Self {
        match e {
            CanvasError::UnknownTarget(_)
            | CanvasError::UnsupportedFormat(_)
            | CanvasError::Create { .. } => BlitError::CanvasOpen(e.to_string()),
            CanvasError::Encode { .. }
            | CanvasError::Remove { .. }
            | CanvasError::BufferMismatch { .. }
            | CanvasError::NotOpen => BlitError::Canvas(e.to_string()),
        }
    }
}

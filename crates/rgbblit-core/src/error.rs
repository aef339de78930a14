use std::path::PathBuf;

use thiserror::Error;

/// Coarse failure category. Every kind is fatal for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Input,
    Transport,
    Canvas,
    Launch,
}

#[derive(Debug, Error)]
pub enum BlitError {
    #[error("invalid number of workers ({0})")]
    InvalidWorkerCount(String),

    #[error("{workers} workers requested but the input only holds {pixels} pixels")]
    TooManyWorkers { workers: usize, pixels: u64 },

    #[error("invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("unknown partition mode `{0}`")]
    UnknownPartitionMode(String),

    #[error("unknown launcher `{0}`")]
    UnknownLauncher(String),

    #[error("invalid input length. Expected a multiple of {stride} but got {len}")]
    InputLength { len: u64, stride: u64 },

    #[error("input holds {actual} rows but the canvas is {expected} rows high")]
    RowCountMismatch { expected: u64, actual: u64 },

    #[error("chunk [{start}, +{len}) does not start and end on a pixel boundary")]
    MisalignedChunk { start: u64, len: u64 },

    #[error("{op} `{}` failed: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("point stream error: {0}")]
    Stream(#[from] std::io::Error),

    #[error("point stream ended inside a record ({got} of {expected} bytes)")]
    TruncatedRecord { got: usize, expected: usize },

    #[error("all workers hung up after {received} of {expected} points")]
    Disconnected { received: u64, expected: u64 },

    #[error("receiver hung up while sending point ({x}, {y})")]
    ReceiverGone { x: u16, y: u16 },

    #[error("point ({x}, {y}) lies outside the {width}x{height} canvas")]
    PointOutOfBounds {
        x: u16,
        y: u16,
        width: u32,
        height: u32,
    },

    #[error("could not open display: {0}")]
    CanvasOpen(String),

    #[error("canvas error: {0}")]
    Canvas(String),

    #[error("failed to launch workers: {0}")]
    Launch(String),

    #[error("worker {index} failed: {reason}")]
    WorkerFailed { index: usize, reason: String },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl BlitError {
    /// Wraps an I/O error with the operation and file it came from.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWorkerCount(_)
            | Self::TooManyWorkers { .. }
            | Self::InvalidDimensions { .. }
            | Self::UnknownPartitionMode(_)
            | Self::UnknownLauncher(_)
            | Self::Config(_) => ErrorKind::Argument,
            Self::InputLength { .. }
            | Self::RowCountMismatch { .. }
            | Self::MisalignedChunk { .. }
            | Self::Io { .. } => ErrorKind::Input,
            Self::Stream(_)
            | Self::TruncatedRecord { .. }
            | Self::Disconnected { .. }
            | Self::ReceiverGone { .. }
            | Self::PointOutOfBounds { .. } => ErrorKind::Transport,
            Self::CanvasOpen(_) | Self::Canvas(_) => ErrorKind::Canvas,
            Self::Launch(_) | Self::WorkerFailed { .. } => ErrorKind::Launch,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlitError>;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlitError;
use crate::point::BYTES_PER_PIXEL;

/// How the source file is split between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMode {
    /// Whole pixels per worker; boundaries always fall on a triplet.
    #[default]
    Aligned,
    /// Raw `len / n` byte split. Boundaries may split a triplet when `n`
    /// does not divide the pixel count.
    Bytes,
}

impl PartitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aligned => "aligned",
            Self::Bytes => "bytes",
        }
    }
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionMode {
    type Err = BlitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aligned" => Ok(Self::Aligned),
            "bytes" => Ok(Self::Bytes),
            other => Err(BlitError::UnknownPartitionMode(other.to_string())),
        }
    }
}

/// A contiguous byte range of the source file owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub start: u64,
    pub len: u64,
}

impl Chunk {
    /// Chunk for worker `index` of `workers` over a file of `total_len` bytes.
    ///
    /// Workers `0..n-1` get an equal share; the last worker absorbs the
    /// remainder so the chunks cover `[0, total_len)` exactly once.
    pub fn for_worker(mode: PartitionMode, total_len: u64, workers: usize, index: usize) -> Self {
        debug_assert!(workers > 0 && index < workers);
        let (unit, units) = match mode {
            PartitionMode::Aligned => (BYTES_PER_PIXEL, total_len / BYTES_PER_PIXEL),
            PartitionMode::Bytes => (1, total_len),
        };
        let share = units / workers as u64;
        let start = share * index as u64 * unit;
        let end = if index + 1 == workers {
            total_len
        } else {
            (start + share * unit).min(total_len)
        };
        Self {
            start,
            len: end - start,
        }
    }

    /// Every chunk of a run, in worker order.
    pub fn all(mode: PartitionMode, total_len: u64, workers: usize) -> Vec<Self> {
        (0..workers)
            .map(|i| Self::for_worker(mode, total_len, workers, i))
            .collect()
    }

    /// Inclusive end offset. Only meaningful for non-empty chunks.
    pub fn end(&self) -> u64 {
        self.start + self.len - 1
    }

    /// True when the chunk starts on a triplet and holds whole triplets.
    pub fn is_pixel_aligned(&self) -> bool {
        self.start % BYTES_PER_PIXEL == 0 && self.len % BYTES_PER_PIXEL == 0
    }

    pub fn pixel_count(&self) -> u64 {
        self.len / BYTES_PER_PIXEL
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes: [{}, {}]", self.len, self.start, self.end())
    }
}

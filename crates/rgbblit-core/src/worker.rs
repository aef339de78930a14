use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::channel::PointSender;
use crate::context::{Role, RunContext};
use crate::error::{BlitError, Result};
use crate::filters::FilterChain;
use crate::geometry::Geometry;
use crate::partition::{Chunk, PartitionMode};
use crate::point::{BYTES_PER_PIXEL, PixelPoint, Rgb};

/// Everything a worker needs besides its own index. Identical for every
/// worker in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerJob {
    pub input: PathBuf,
    pub filters: FilterChain,
    pub geometry: Geometry,
    pub partition: PartitionMode,
}

impl WorkerJob {
    /// Command-line arguments that make a re-executed binary act as worker `index`.
    pub fn worker_args(&self, index: usize, worker_count: usize) -> Vec<String> {
        let mut args = vec![
            "--worker-index".to_string(),
            index.to_string(),
            "--width".to_string(),
            self.geometry.width.to_string(),
            "--height".to_string(),
            self.geometry.height.to_string(),
            "--partition".to_string(),
            self.partition.to_string(),
            "--".to_string(),
            worker_count.to_string(),
            self.input.to_string_lossy().into_owned(),
        ];
        if !self.filters.is_empty() {
            args.push(self.filters.to_string());
        }
        args
    }
}

/// What a worker did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub index: usize,
    pub chunk: Chunk,
    pub sent: u64,
}

/// Reads one chunk of the source file and streams its pixels to the renderer.
pub struct Worker<'a> {
    ctx: RunContext,
    job: &'a WorkerJob,
}

impl<'a> Worker<'a> {
    pub fn new(ctx: RunContext, job: &'a WorkerJob) -> Self {
        Self { ctx, job }
    }

    pub fn index(&self) -> usize {
        match self.ctx.role {
            Role::Worker { index } => index,
            Role::Renderer => 0,
        }
    }

    /// Read the chunk, filter every triplet, and send one point per triplet.
    pub fn run<S: PointSender + ?Sized>(&self, sender: &mut S) -> Result<WorkerReport> {
        let path = &self.job.input;
        info!("{}: opening file `{}' for reading", self.ctx, path.display());
        let mut file = File::open(path).map_err(|e| BlitError::io("open", path, e))?;
        let total_len = file
            .metadata()
            .map_err(|e| BlitError::io("stat", path, e))?
            .len();

        let stride = self.job.geometry.row_stride();
        if total_len == 0 || total_len % stride != 0 {
            return Err(BlitError::InputLength {
                len: total_len,
                stride,
            });
        }

        let chunk = Chunk::for_worker(
            self.job.partition,
            total_len,
            self.ctx.worker_count,
            self.index(),
        );
        info!("{}: {}", self.ctx, chunk);
        if !chunk.is_pixel_aligned() {
            return Err(BlitError::MisalignedChunk {
                start: chunk.start,
                len: chunk.len,
            });
        }

        let buf = read_chunk(&mut file, path, chunk)?;
        let points = self.points_for(chunk, &buf);
        debug!(
            "{}: filters `{}' applied to {} pixels",
            self.ctx,
            self.job.filters,
            points.len()
        );

        for point in &points {
            sender.send(*point)?;
        }
        sender.flush()?;

        Ok(WorkerReport {
            index: self.index(),
            chunk,
            sent: points.len() as u64,
        })
    }

    /// Map each triplet of `buf` (which starts at `chunk.start`) to a filtered point.
    fn points_for(&self, chunk: Chunk, buf: &[u8]) -> Vec<PixelPoint> {
        let geometry = self.job.geometry;
        let filters = &self.job.filters;
        buf.par_chunks_exact(BYTES_PER_PIXEL as usize)
            .enumerate()
            .map(|(off, triplet)| {
                let (x, y) = geometry.coordinate_of(chunk.start + off as u64 * BYTES_PER_PIXEL);
                PixelPoint::new(x, y, filters.apply(Rgb::from_triplet(triplet)))
            })
            .collect()
    }
}

/// Random-access read of exactly `chunk.len` bytes at `chunk.start`.
fn read_chunk(file: &mut File, path: &Path, chunk: Chunk) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; chunk.len as usize];
    file.seek(SeekFrom::Start(chunk.start))
        .map_err(|e| BlitError::io("seek", path, e))?;
    file.read_exact(&mut buf)
        .map_err(|e| BlitError::io("read", path, e))?;
    Ok(buf)
}

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::canvas::Canvas;
use crate::config::RunConfig;
use crate::context::RunContext;
use crate::error::{BlitError, ErrorKind, Result};
use crate::filters::FilterChain;
use crate::geometry::Geometry;
use crate::launcher::Launcher;
use crate::point::BYTES_PER_PIXEL;
use crate::renderer::{RenderStats, Renderer};
use crate::worker::WorkerJob;

/// A validated run, ready to launch.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRun {
    pub job: WorkerJob,
    pub worker_count: usize,
}

/// Parse a worker count; anything but a positive integer is rejected.
pub fn parse_worker_count(arg: &str) -> Result<usize> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(BlitError::InvalidWorkerCount(arg.to_string())),
    }
}

/// Work out the canvas size from the input length. The length must be a
/// whole number of rows; a configured height must match the row count.
pub fn resolve_geometry(config: &RunConfig, input_len: u64) -> Result<Geometry> {
    let probe = Geometry::new(config.width, 1)?;
    let stride = probe.row_stride();
    if input_len == 0 || input_len % stride != 0 {
        return Err(BlitError::InputLength {
            len: input_len,
            stride,
        });
    }
    let rows = input_len / stride;
    match config.height {
        Some(height) if height as u64 != rows => Err(BlitError::RowCountMismatch {
            expected: height as u64,
            actual: rows,
        }),
        Some(height) => Geometry::new(config.width, height),
        None => Geometry::new(config.width, u32::try_from(rows).unwrap_or(u32::MAX)),
    }
}

/// Validates arguments, starts the workers, then acts as the renderer.
pub struct Coordinator {
    config: RunConfig,
}

impl Coordinator {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Check every argument and the input file before anything is spawned.
    pub fn prepare(
        &self,
        num_workers: &str,
        input: &Path,
        filters: Option<&str>,
    ) -> Result<PreparedRun> {
        let worker_count = parse_worker_count(num_workers)?;

        let input_len = fs::metadata(input)
            .map_err(|e| BlitError::io("stat", input, e))?
            .len();
        let geometry = resolve_geometry(&self.config, input_len)?;

        let pixels = input_len / BYTES_PER_PIXEL;
        if worker_count as u64 > pixels {
            return Err(BlitError::TooManyWorkers {
                workers: worker_count,
                pixels,
            });
        }

        Ok(PreparedRun {
            job: WorkerJob {
                input: PathBuf::from(input),
                filters: FilterChain::parse(filters.unwrap_or("")),
                geometry,
                partition: self.config.partition,
            },
            worker_count,
        })
    }

    /// Launch the workers and render their points. Any failure aborts the
    /// remaining workers and fails the whole run.
    pub fn run<L, C>(&self, prepared: &PreparedRun, launcher: &L, canvas: &mut C) -> Result<RenderStats>
    where
        L: Launcher + ?Sized,
        C: Canvas + ?Sized,
    {
        let ctx = RunContext::renderer(prepared.worker_count);
        info!(
            "{ctx}: {} workers, {} partition, filters `{}'",
            prepared.worker_count, prepared.job.partition, prepared.job.filters
        );

        let mut launched = launcher.launch(&prepared.job, prepared.worker_count)?;
        let rendered =
            Renderer::new(ctx, prepared.job.geometry).render(canvas, &mut launched.points);

        if rendered.is_err() {
            for handle in &mut launched.handles {
                handle.abort();
            }
        }
        drop(launched.points);

        let mut worker_errors = Vec::new();
        for handle in launched.handles {
            let index = handle.index();
            if let Err(e) = handle.wait() {
                error!("w{index}: {e}");
                worker_errors.push(e);
            }
        }

        match rendered {
            Ok(stats) => match worker_errors.into_iter().next() {
                Some(e) => Err(e),
                None => Ok(stats),
            },
            // A transport failure on the renderer side is usually the echo
            // of a worker that died; report the worker's own error instead.
            Err(e) if e.kind() == ErrorKind::Transport => Err(root_cause(worker_errors).unwrap_or(e)),
            Err(e) => Err(e),
        }
    }
}

fn root_cause(errors: Vec<BlitError>) -> Option<BlitError> {
    let mut fallback = None;
    for e in errors {
        if e.kind() != ErrorKind::Transport {
            return Some(e);
        }
        fallback.get_or_insert(e);
    }
    fallback
}

use std::io;

use anyhow::{Context, bail};
use log::info;
use rgbblit_canvas::target::DisplayTarget;
use rgbblit_core::context::RunContext;
use rgbblit_core::coordinator::{Coordinator, parse_worker_count};
use rgbblit_core::channel::StreamSender;
use rgbblit_core::config::{LauncherKind, RunConfig};
use rgbblit_core::filters::FilterChain;
use rgbblit_core::geometry::Geometry;
use rgbblit_core::launcher::{Launcher, ProcessLauncher, ThreadLauncher};
use rgbblit_core::renderer::RenderStats;
use rgbblit_core::worker::{Worker, WorkerJob, WorkerReport};

use crate::args::Cli;

/// What one invocation of the binary ended up doing.
#[derive(Debug)]
pub enum Outcome {
    /// Positional arguments were missing; usage was shown.
    Usage,
    Rendered(RenderStats),
    Worked(WorkerReport),
}

pub struct App {
    cli: Cli,
    config: RunConfig,
}

impl App {
    pub fn new(cli: Cli) -> anyhow::Result<Self> {
        let config = cli.run_config().context("loading configuration")?;
        Ok(Self { cli, config })
    }

    pub fn run(&self) -> anyhow::Result<Outcome> {
        let (Some(num_workers), Some(input)) = (&self.cli.num_workers, &self.cli.input) else {
            return Ok(Outcome::Usage);
        };
        match self.cli.worker_index {
            Some(index) => self.run_worker(index, num_workers, input),
            None => self.run_renderer(num_workers, input),
        }
    }

    /// Worker side of a process launch: one chunk, points on stdout.
    fn run_worker(
        &self,
        index: usize,
        num_workers: &str,
        input: &std::path::Path,
    ) -> anyhow::Result<Outcome> {
        let count = parse_worker_count(num_workers)?;
        if index >= count {
            bail!("worker index {index} out of range for {count} workers");
        }
        let Some(height) = self.config.height else {
            bail!("worker {index} started without --height");
        };
        let job = WorkerJob {
            input: input.to_path_buf(),
            filters: FilterChain::parse(self.cli.filters.as_deref().unwrap_or("")),
            geometry: Geometry::new(self.config.width, height)?,
            partition: self.config.partition,
        };

        let mut sender = StreamSender::new(io::stdout());
        let report = Worker::new(RunContext::worker(index, count), &job)
            .run(&mut sender)
            .with_context(|| input.display().to_string())?;
        Ok(Outcome::Worked(report))
    }

    fn run_renderer(&self, num_workers: &str, input: &std::path::Path) -> anyhow::Result<Outcome> {
        let coordinator = Coordinator::new(self.config.clone());
        let prepared = coordinator.prepare(num_workers, input, self.cli.filters.as_deref())?;

        let target = DisplayTarget::resolve(self.config.display.as_deref())?;
        info!("r0: display {target}");
        let mut canvas = target.canvas();

        let launcher: Box<dyn Launcher> = match self.config.launcher {
            LauncherKind::Processes => Box::new(ProcessLauncher::current_exe()?),
            LauncherKind::Threads => Box::new(ThreadLauncher),
        };
        let stats = coordinator.run(&prepared, launcher.as_ref(), canvas.as_mut())?;
        Ok(Outcome::Rendered(stats))
    }
}

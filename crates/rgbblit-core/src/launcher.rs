//! Starting worker tasks. The rest of the crate only sees [`Launcher`] and
//! never depends on how a worker is physically created.

use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};

use log::{debug, info};

use crate::channel::{PointReceiver, fan_in, memory_channel};
use crate::context::RunContext;
use crate::error::{BlitError, Result};
use crate::worker::{Worker, WorkerJob, WorkerReport};

/// A running worker.
pub trait WorkerHandle: Send {
    fn index(&self) -> usize;

    /// Block until the worker is done, surfacing its own failure.
    fn wait(self: Box<Self>) -> Result<()>;

    /// Ask the worker to stop early. Best effort.
    fn abort(&mut self) {}
}

/// Workers that have been started plus the single receiver fed by all of them.
pub struct LaunchedWorkers {
    pub points: Box<dyn PointReceiver>,
    pub handles: Vec<Box<dyn WorkerHandle>>,
}

pub trait Launcher {
    /// Start `count` workers for `job`, worker `i` taking chunk `i`.
    fn launch(&self, job: &WorkerJob, count: usize) -> Result<LaunchedWorkers>;
}

// =============================================================================
// Threads
// =============================================================================

/// Runs every worker on its own thread inside this process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadLauncher;

struct ThreadHandle {
    index: usize,
    handle: JoinHandle<Result<WorkerReport>>,
}

impl WorkerHandle for ThreadHandle {
    fn index(&self) -> usize {
        self.index
    }

    fn wait(self: Box<Self>) -> Result<()> {
        let ThreadHandle { index, handle } = *self;
        let report = handle.join().map_err(|_| BlitError::WorkerFailed {
            index,
            reason: "worker thread panicked".into(),
        })??;
        debug!("w{}: sent {} points", report.index, report.sent);
        Ok(())
    }
}

type WorkerTask = Box<dyn FnOnce() -> Result<WorkerReport> + Send>;

fn spawn_named(index: usize, task: WorkerTask) -> io::Result<JoinHandle<Result<WorkerReport>>> {
    thread::Builder::new()
        .name(format!("rgbblit-w{index}"))
        .spawn(task)
}

impl ThreadLauncher {
    /// Start the workers through `spawn`. If one fails to start, the channel
    /// is closed and every worker already running is joined before the
    /// error is returned.
    fn launch_with<F>(&self, job: &WorkerJob, count: usize, mut spawn: F) -> Result<LaunchedWorkers>
    where
        F: FnMut(usize, WorkerTask) -> io::Result<JoinHandle<Result<WorkerReport>>>,
    {
        let (tx, rx) = memory_channel();
        let mut handles: Vec<Box<dyn WorkerHandle>> = Vec::with_capacity(count);
        for index in 0..count {
            let job = job.clone();
            let mut tx = tx.clone();
            let task: WorkerTask =
                Box::new(move || Worker::new(RunContext::worker(index, count), &job).run(&mut tx));
            let handle = match spawn(index, task) {
                Ok(handle) => handle,
                Err(e) => {
                    drop(rx);
                    for started in handles {
                        let started_index = started.index();
                        if let Err(worker_err) = started.wait() {
                            debug!("w{started_index}: stopped after launch failure: {worker_err}");
                        }
                    }
                    return Err(BlitError::Launch(format!(
                        "spawning worker thread {index}: {e}"
                    )));
                }
            };
            handles.push(Box::new(ThreadHandle { index, handle }));
        }
        info!("started {count} worker threads");
        Ok(LaunchedWorkers {
            points: Box::new(rx),
            handles,
        })
    }
}

impl Launcher for ThreadLauncher {
    fn launch(&self, job: &WorkerJob, count: usize) -> Result<LaunchedWorkers> {
        self.launch_with(job, count, spawn_named)
    }
}

// =============================================================================
// Processes
// =============================================================================

/// Re-executes a program once per worker. Each child writes point records
/// to its stdout; stderr is inherited so child logs reach the console.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Launcher that re-executes the running binary.
    pub fn current_exe() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| BlitError::Launch(format!("locating current executable: {e}")))?;
        Ok(Self::new(exe))
    }

    fn command(&self, job: &WorkerJob, index: usize, count: usize) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(job.worker_args(index, count))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}

struct ProcessHandle {
    index: usize,
    child: Child,
    forwarder: Option<JoinHandle<Result<u64>>>,
}

impl WorkerHandle for ProcessHandle {
    fn index(&self) -> usize {
        self.index
    }

    fn wait(mut self: Box<Self>) -> Result<()> {
        let status = self.child.wait().map_err(|e| BlitError::WorkerFailed {
            index: self.index,
            reason: format!("waiting for process: {e}"),
        })?;
        if let Some(forwarder) = self.forwarder.take() {
            let relayed = forwarder.join().map_err(|_| BlitError::WorkerFailed {
                index: self.index,
                reason: "stream reader panicked".into(),
            })??;
            debug!("w{}: relayed {relayed} points", self.index);
        }
        if !status.success() {
            return Err(BlitError::WorkerFailed {
                index: self.index,
                reason: format!("process {status}"),
            });
        }
        Ok(())
    }

    fn abort(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("w{}: kill: {e}", self.index);
        }
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, job: &WorkerJob, count: usize) -> Result<LaunchedWorkers> {
        let mut children: Vec<Child> = Vec::with_capacity(count);
        let mut stdouts = Vec::with_capacity(count);
        for index in 0..count {
            let spawned = self
                .command(job, index, count)
                .spawn()
                .map_err(|e| BlitError::Launch(format!("{}: {e}", self.program.display())));
            let mut child = match spawned {
                Ok(child) => child,
                Err(e) => {
                    for mut started in children {
                        let _ = started.kill();
                        let _ = started.wait();
                    }
                    return Err(e);
                }
            };
            let stdout = child
                .stdout
                .take()
                .ok_or_else(|| BlitError::Launch(format!("worker {index} has no stdout pipe")))?;
            stdouts.push(stdout);
            children.push(child);
        }
        info!("spawned {count} worker processes");

        let (rx, forwarders) = fan_in(stdouts);
        let handles = children
            .into_iter()
            .zip(forwarders)
            .enumerate()
            .map(|(index, (child, forwarder))| {
                Box::new(ProcessHandle {
                    index,
                    child,
                    forwarder: Some(forwarder),
                }) as Box<dyn WorkerHandle>
            })
            .collect();
        Ok(LaunchedWorkers {
            points: Box::new(rx),
            handles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterChain;
    use crate::geometry::Geometry;
    use crate::partition::PartitionMode;

    #[test]
    fn test_thread_launcher_feeds_one_receiver() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.rgb");
        std::fs::write(&input, (0..24).collect::<Vec<u8>>()).unwrap();
        let job = WorkerJob {
            input,
            filters: FilterChain::default(),
            geometry: Geometry::new(4, 2).unwrap(),
            partition: PartitionMode::Aligned,
        };

        let mut launched = ThreadLauncher.launch(&job, 3).unwrap();
        let mut count = 0;
        while launched.points.recv().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 8);
        for handle in launched.handles {
            handle.wait().unwrap();
        }
    }

    #[test]
    fn test_thread_handle_surfaces_worker_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = WorkerJob {
            input: dir.path().join("missing.rgb"),
            filters: FilterChain::default(),
            geometry: Geometry::new(1, 1).unwrap(),
            partition: PartitionMode::Aligned,
        };
        let launched = ThreadLauncher.launch(&job, 1).unwrap();
        let handle = launched.handles.into_iter().next().unwrap();
        assert_eq!(handle.index(), 0);
        assert!(matches!(handle.wait(), Err(BlitError::Io { op: "open", .. })));
    }

    #[test]
    fn test_process_launcher_reports_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let job = WorkerJob {
            input: dir.path().join("in.rgb"),
            filters: FilterChain::default(),
            geometry: Geometry::new(1, 1).unwrap(),
            partition: PartitionMode::Aligned,
        };
        let launcher = ProcessLauncher::new(dir.path().join("no-such-program"));
        assert!(matches!(
            launcher.launch(&job, 2),
            Err(BlitError::Launch(_))
        ));
    }

    #[test]
    fn test_thread_spawn_failure_joins_started_workers() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.rgb");
        std::fs::write(&input, [7u8; 36]).unwrap();
        let job = WorkerJob {
            input,
            filters: FilterChain::default(),
            geometry: Geometry::new(4, 3).unwrap(),
            partition: PartitionMode::Aligned,
        };

        let finished = Arc::new(AtomicUsize::new(0));
        let result = ThreadLauncher.launch_with(&job, 4, |index, task| {
            if index == 2 {
                return Err(io::Error::other("thread limit reached"));
            }
            let finished = Arc::clone(&finished);
            Ok(thread::spawn(move || {
                let report = task();
                finished.fetch_add(1, Ordering::SeqCst);
                report
            }))
        });

        assert!(matches!(result, Err(BlitError::Launch(ref msg)) if msg.contains("thread 2")));
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }
}

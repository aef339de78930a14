use std::path::PathBuf;

use clap::Parser;
use rgbblit_core::config::{LauncherKind, RunConfig};
use rgbblit_core::error::Result;
use rgbblit_core::partition::PartitionMode;

pub const USAGE: &str = "usage: rgbblit NUM_WORKERS INPUT_FILE [FILTERS]";

/// Split a raw RGB image across workers, filter it, and paint it back together.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rgbblit", version, about)]
pub struct Cli {
    /// Number of worker tasks to split the image across.
    pub num_workers: Option<String>,

    /// Raw row-major RGB file.
    pub input: Option<PathBuf>,

    /// Filter codes applied left to right: g(rayscale) i(nvert) l(ighten) d(arken).
    pub filters: Option<String>,

    /// JSON run configuration. Flags below override its fields.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Image width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels; inferred from the file length when omitted.
    #[arg(long)]
    pub height: Option<u32>,

    /// Chunk partitioning: `aligned` or `bytes`.
    #[arg(long)]
    pub partition: Option<PartitionMode>,

    /// How workers are started: `processes` or `threads`.
    #[arg(long)]
    pub launcher: Option<LauncherKind>,

    /// Canvas target: `memory` or `file:<path>`.
    #[arg(long)]
    pub display: Option<String>,

    /// Run as worker N of a process launch.
    #[arg(long, hide = true)]
    pub worker_index: Option<usize>,
}

impl Cli {
    /// The config file, if any, with command-line overrides applied.
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if let Some(partition) = self.partition {
            config.partition = partition;
        }
        if let Some(launcher) = self.launcher {
            config.launcher = launcher;
        }
        if self.display.is_some() {
            config.display = self.display.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rgbblit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positionals() {
        let cli = parse(&["4", "img.rgb", "gi"]);
        assert_eq!(cli.num_workers.as_deref(), Some("4"));
        assert_eq!(cli.input, Some(PathBuf::from("img.rgb")));
        assert_eq!(cli.filters.as_deref(), Some("gi"));
        assert_eq!(cli.worker_index, None);
    }

    #[test]
    fn test_missing_positionals_parse() {
        let cli = parse(&[]);
        assert!(cli.num_workers.is_none());
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&[
            "--width", "2", "--partition", "bytes", "--launcher", "threads", "--display", "memory",
            "1", "x.rgb",
        ]);
        let config = cli.run_config().unwrap();
        assert_eq!(config.width, 2);
        assert_eq!(config.height, None);
        assert_eq!(config.partition, PartitionMode::Bytes);
        assert_eq!(config.launcher, LauncherKind::Threads);
        assert_eq!(config.display.as_deref(), Some("memory"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"width": 8, "height": 3, "display": "file:a.png"}"#).unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "--width", "4"]);
        let config = cli.run_config().unwrap();
        assert_eq!(config.width, 4);
        assert_eq!(config.height, Some(3));
        assert_eq!(config.display.as_deref(), Some("file:a.png"));
    }

    #[test]
    fn test_unknown_partition_is_rejected() {
        assert!(Cli::try_parse_from(["rgbblit", "--partition", "rows"]).is_err());
    }

    #[test]
    fn test_worker_args_parse_back() {
        let cli = parse(&[
            "--worker-index", "1", "--width", "4", "--height", "2", "--partition", "aligned", "--",
            "3", "/data/in.rgb", "gi",
        ]);
        assert_eq!(cli.worker_index, Some(1));
        assert_eq!(cli.num_workers.as_deref(), Some("3"));
        assert_eq!(cli.filters.as_deref(), Some("gi"));
    }
}

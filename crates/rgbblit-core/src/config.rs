use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlitError, Result};
use crate::partition::PartitionMode;

pub const DEFAULT_WIDTH: u32 = 400;

/// How worker tasks are started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LauncherKind {
    /// One child process per worker, points over pipes.
    #[default]
    Processes,
    /// One thread per worker inside this process.
    Threads,
}

impl fmt::Display for LauncherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Processes => "processes",
            Self::Threads => "threads",
        })
    }
}

impl FromStr for LauncherKind {
    type Err = BlitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "processes" => Ok(Self::Processes),
            "threads" => Ok(Self::Threads),
            other => Err(BlitError::UnknownLauncher(other.to_string())),
        }
    }
}

/// Settings for one run. Every field has a default, so a config file only
/// needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub width: u32,
    /// Rows in the image. `None` infers it from the input length.
    pub height: Option<u32>,
    pub partition: PartitionMode,
    pub launcher: LauncherKind,
    /// Display target for the renderer's canvas.
    pub display: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: None,
            partition: PartitionMode::default(),
            launcher: LauncherKind::default(),
            display: None,
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(path).map_err(|e| BlitError::io("read config", path, e))?;
        let config: Self = serde_json::from_str(&json)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| BlitError::io("write config", path, e))?;
        Ok(())
    }
}

use std::path::{Path, PathBuf};

/// Get a temporary directory for test fixtures that persists for the test run.
pub fn fixture_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("failed to create temp dir for fixtures")
}

/// Write raw RGB bytes to `<dir>/<name>.rgb` and return the path.
pub fn write_raw_rgb(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(format!("{name}.rgb"));
    std::fs::write(&path, bytes).expect("failed to write raw rgb fixture");
    path
}

/// A file whose length is not a whole number of rows for `width`.
pub fn write_truncated_rgb(dir: &Path, name: &str, width: u32) -> PathBuf {
    let len = width as usize * 3 * 2 - 1;
    write_raw_rgb(dir, name, &vec![0x7f; len])
}

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Records used by most scenarios: two in Roma, one in Milano.
pub const CITIES: &str = "{\"city\":\"Roma\",\"id\":1}\n{\"city\":\"Milano\",\"id\":2}\n{\"city\":\"Roma\",\"id\":3}\n";

/// Write `content` to `name` inside `dir`, returning the file path.
pub fn write_data(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test data");
    path
}

/// Run the ndtable binary with the given arguments
pub fn run_ndtable(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ndtable"))
        .args(args)
        .output()
        .expect("Failed to execute ndtable binary")
}

/// Run the ndtable binary against a data file
pub fn run_ndtable_on(path: &Path, args: &[&str]) -> Output {
    let path = path.to_str().expect("temp path should be UTF-8");
    let mut all = vec![path];
    all.extend_from_slice(args);
    run_ndtable(&all)
}

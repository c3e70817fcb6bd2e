//! Shared test helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a sigbar command
pub fn sigbar() -> Command {
    Command::new(cargo::cargo_bin!("sigbar"))
}

/// Write a small three-group dataset and return its path
pub fn write_dataset(tmp: &TempDir) -> PathBuf {
    write_csv(
        tmp,
        "data.csv",
        "group,value\n\
         Ctrl,1.0\nCtrl,1.2\nCtrl,0.9\n\
         TrtA,2.0\nTrtA,2.3\nTrtA,1.8\n\
         TrtB,1.1\nTrtB,1.0\nTrtB,1.3\n",
    )
}

/// Write a Tukey-style comparison result table and return its path
pub fn write_results(tmp: &TempDir) -> PathBuf {
    write_csv(
        tmp,
        "results.csv",
        "comparison,p.adj\n\
         TrtA-Ctrl,0.004\n\
         TrtB-Ctrl,0.82\n\
         TrtB-TrtA,0.01\n",
    )
}

pub fn write_csv(tmp: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = tmp.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Install a fake `Rscript` shell script in the temp dir (unix only).
///
/// The body runs with the same positional arguments the real runtime
/// would receive after the script path.
#[cfg(unix)]
pub fn write_fake_rscript(tmp: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = tmp.path().join("fake-rscript");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

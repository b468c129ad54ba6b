//! Shared test utilities for multiso tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use multiso::config::Config;

/// Test environment with temporary boot and data partitions.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Mounted boot/EFI partition stand-in
    pub boot_mount: PathBuf,
    /// Mounted data partition stand-in
    pub data_mount: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with a grub dir and an iso dir.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let boot_mount = base.join("boot");
        let data_mount = base.join("data");

        fs::create_dir_all(boot_mount.join("boot/grub")).expect("Failed to create grub dir");
        fs::create_dir_all(data_mount.join("iso")).expect("Failed to create iso dir");

        Self {
            _temp_dir: temp_dir,
            boot_mount,
            data_mount,
        }
    }

    /// Build the configuration pointing at this environment.
    pub fn config(&self) -> Config {
        Config {
            boot_mount: self.boot_mount.clone(),
            data_mount: self.data_mount.clone(),
            data_label: "MULTISO".to_string(),
            iso_dir: "iso".to_string(),
            templates_path: None,
        }
    }

    /// Drop a (dummy) installer image into the iso directory.
    pub fn add_iso(&self, file_name: &str) -> PathBuf {
        let path = self.data_mount.join("iso").join(file_name);
        fs::write(&path, b"not a real image").expect("Failed to write iso");
        path
    }

    /// Create an extracted-tree source directory.
    pub fn add_tree(&self, name: &str) -> PathBuf {
        let path = self.data_mount.join(name);
        fs::create_dir_all(&path).expect("Failed to create tree");
        path
    }

    /// Scratch directory for image inspection mounts.
    pub fn scratch(&self) -> PathBuf {
        let path = self._temp_dir.path().join("scratch");
        fs::create_dir_all(&path).expect("Failed to create scratch dir");
        path
    }
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(path, content).expect("Failed to write file");
}

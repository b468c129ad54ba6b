//! Configuration management for multiso.
//!
//! Reads configuration from a .env file and environment variables.
//! Environment variables take precedence over the .env file (main loads
//! .env via dotenvy before calling `Config::load`).

use std::env;
use std::path::PathBuf;

/// Default mountpoint of the medium's boot/EFI partition.
pub const DEFAULT_BOOT_MOUNT: &str = "/mnt/multiso/boot";

/// Default mountpoint of the medium's data partition.
pub const DEFAULT_DATA_MOUNT: &str = "/mnt/multiso/data";

/// Default filesystem label of the data partition.
pub const DEFAULT_DATA_LABEL: &str = "MULTISO";

/// Default directory (under the data partition) holding installer images.
pub const DEFAULT_ISO_DIR: &str = "iso";

/// Multiso configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the boot/EFI partition is mounted (default: /mnt/multiso/boot)
    pub boot_mount: PathBuf,
    /// Where the data partition is mounted (default: /mnt/multiso/data)
    pub data_mount: PathBuf,
    /// Filesystem label of the data partition, referenced by boot parameters
    pub data_label: String,
    /// Subdirectory of the data partition holding installer images
    pub iso_dir: String,
    /// Optional JSON file overriding the built-in loopback templates
    pub templates_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Self {
        let boot_mount = env::var("MULTISO_BOOT_MOUNT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BOOT_MOUNT));

        let data_mount = env::var("MULTISO_DATA_MOUNT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_MOUNT));

        let data_label = env::var("MULTISO_DATA_LABEL")
            .unwrap_or_else(|_| DEFAULT_DATA_LABEL.to_string());

        let iso_dir =
            env::var("MULTISO_ISO_DIR").unwrap_or_else(|_| DEFAULT_ISO_DIR.to_string());

        let templates_path = env::var_os("MULTISO_TEMPLATES").map(PathBuf::from);

        Self {
            boot_mount,
            data_mount,
            data_label,
            iso_dir,
            templates_path,
        }
    }

    /// Directory on the data partition that holds installer images.
    pub fn iso_root(&self) -> PathBuf {
        self.data_mount.join(&self.iso_dir)
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  MULTISO_BOOT_MOUNT: {}", self.boot_mount.display());
        println!("  MULTISO_DATA_MOUNT: {}", self.data_mount.display());
        println!("  MULTISO_DATA_LABEL: {}", self.data_label);
        println!("  MULTISO_ISO_DIR: {}", self.iso_dir);
        match &self.templates_path {
            Some(path) => println!("  MULTISO_TEMPLATES: {}", path.display()),
            None => println!("  MULTISO_TEMPLATES: (built-in templates)"),
        }
    }
}

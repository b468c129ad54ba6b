//! Installer source catalog.
//!
//! The catalog is rediscovered on every run by listing the data partition:
//! `.iso` files under the iso directory become Image sources, top-level
//! directories become ExtractedTree sources. Nothing is persisted between
//! runs except the files themselves.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;

/// How a source was supplied on the data partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A raw installer image file.
    Image,
    /// An already-expanded installer directory tree.
    ExtractedTree,
}

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct InstallerSource {
    /// Derived from the file stem (images) or directory base name (trees).
    pub name: String,
    pub kind: SourceKind,
    /// Absolute path on the mounted data partition.
    pub path: PathBuf,
    /// Path of the source as GRUB sees it from the data partition root,
    /// e.g. `/iso/ubuntu-24.04.iso` or `/WindowsToGo`.
    pub medium_path: String,
}

/// Scan the data partition for installer sources.
///
/// Images are listed first, then extracted trees, each group sorted by
/// name so the scan order (and therefore the emitted configuration) is
/// deterministic. A missing iso directory is not an error; it only means
/// no image sources.
pub fn scan(config: &Config) -> Result<Vec<InstallerSource>> {
    let mut sources = Vec::new();

    let iso_root = config.iso_root();
    if iso_root.is_dir() {
        let mut entries: Vec<_> = fs::read_dir(&iso_root)
            .with_context(|| format!("failed to list {}", iso_root.display()))?
            .filter_map(|e| e.ok())
            .collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.to_lowercase().ends_with(".iso") {
                continue;
            }
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| file_name.clone());
            sources.push(InstallerSource {
                name,
                kind: SourceKind::Image,
                medium_path: format!("/{}/{}", config.iso_dir, file_name),
                path,
            });
        }
    }

    let mut entries: Vec<_> = fs::read_dir(&config.data_mount)
        .with_context(|| format!("failed to list {}", config.data_mount.display()))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.file_name());

    // The iso directory itself and filesystem artifacts are not sources.
    let iso_dir_top = config.iso_dir.split('/').next().unwrap_or("");

    for entry in entries {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || name == iso_dir_top || name == "lost+found" {
            continue;
        }
        sources.push(InstallerSource {
            medium_path: format!("/{}", name),
            name,
            kind: SourceKind::ExtractedTree,
            path,
        });
    }

    Ok(sources)
}

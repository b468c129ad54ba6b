//! Utilities for path checking and directory management.

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

/// Find a directory from multiple possible locations.
///
/// Checks locations in order and returns the first one that exists as a
/// directory. If none exist, returns an error. Used to detect which of the
/// loader's possible configuration directories the bootloader installer
/// created.
///
/// # Arguments
/// * `locations` - Slice of paths to check in order
/// * `error_msg` - Error message if no location exists
pub fn find_dir<'a>(locations: &'a [&Path], error_msg: &str) -> Result<&'a Path> {
    for loc in locations {
        if loc.is_dir() {
            return Ok(loc);
        }
    }
    bail!("{}", error_msg)
}

/// Ensure a directory exists, creating it if necessary.
///
/// This is a convenience wrapper around fs::create_dir_all that doesn't fail
/// if the directory already exists.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

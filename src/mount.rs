//! Scoped loopback mounts for installer image inspection.
//!
//! Every inspection mount is acquired immediately before probing and
//! released immediately after, on success and failure paths alike. The
//! Drop impl is the backstop so no dangling mount survives an early
//! return.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::common::ensure_dir_exists;
use crate::process::Cmd;

/// A read-only loopback mount, unmounted when released or dropped.
pub struct ScopedMount {
    mountpoint: PathBuf,
    active: bool,
}

impl ScopedMount {
    /// Loop-mount an installer image read-only at the given mountpoint.
    pub fn loop_image(image: &Path, mountpoint: &Path) -> Result<Self> {
        ensure_dir_exists(mountpoint)?;

        Cmd::new("mount")
            .args(["-o", "loop,ro"])
            .arg_path(image)
            .arg_path(mountpoint)
            .error_msg(format!("failed to loop-mount {}", image.display()))
            .run()?;

        Ok(Self {
            mountpoint: mountpoint.to_path_buf(),
            active: true,
        })
    }

    /// The mounted root, valid until release.
    pub fn path(&self) -> &Path {
        &self.mountpoint
    }

    /// Unmount explicitly, surfacing any umount failure.
    pub fn release(mut self) -> Result<()> {
        self.active = false;
        Cmd::new("umount")
            .arg_path(&self.mountpoint)
            .error_msg(format!("failed to unmount {}", self.mountpoint.display()))
            .run()?;
        Ok(())
    }
}

impl Drop for ScopedMount {
    fn drop(&mut self) {
        if !self.active {
            return;
        }
        let result = Cmd::new("umount")
            .arg_path(&self.mountpoint)
            .allow_fail()
            .run();
        match result {
            Ok(r) if r.success() => {}
            _ => eprintln!(
                "  [WARN] failed to unmount {} during cleanup",
                self.mountpoint.display()
            ),
        }
    }
}

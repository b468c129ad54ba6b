//! Windows chainload target resolution for extracted trees.
//!
//! Image-kind Windows sources chainload through a GRUB loopback of the
//! image and never reach this module. For extracted trees we probe the
//! conventional firmware loader locations; firmware and GRUB only
//! auto-discover the standard removable-media path, so a loader found
//! only under the Microsoft boot-manager path is copied there first.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Firmware loader locations probed in order, relative to the tree root.
pub const EFI_CANDIDATES: &[&str] = &[
    "EFI/BOOT/BOOTX64.EFI",
    "EFI/Boot/bootx64.efi",
    "efi/boot/bootx64.efi",
];

/// The Windows boot manager's own location.
pub const BOOT_MANAGER: &str = "EFI/Microsoft/Boot/bootmgfw.efi";

/// The standard removable-media path the loader is relocated to.
pub const STANDARD_TARGET: &str = "EFI/BOOT/BOOTX64.EFI";

/// Locate (or produce) a chainloadable firmware binary inside a tree.
///
/// Returns the loader's path as GRUB sees it from the data partition root,
/// or None when the tree has no loader at all (the source is skipped).
/// An error means the relocation copy itself failed.
pub fn resolve_chainload(tree_root: &Path, medium_path: &str) -> Result<Option<String>> {
    for rel in EFI_CANDIDATES {
        if tree_root.join(rel).is_file() {
            return Ok(Some(format!("{}/{}", medium_path, rel)));
        }
    }

    let boot_manager = tree_root.join(BOOT_MANAGER);
    if boot_manager.is_file() {
        let target = tree_root.join(STANDARD_TARGET);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(&boot_manager, &target).with_context(|| {
            format!(
                "failed to relocate {} to {}",
                boot_manager.display(),
                target.display()
            )
        })?;
        return Ok(Some(format!("{}/{}", medium_path, STANDARD_TARGET)));
    }

    Ok(None)
}

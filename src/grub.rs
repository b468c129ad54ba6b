//! GRUB configuration emission.
//!
//! Owns the output document lifecycle: the configuration file is fully
//! regenerated on every run from the resolved catalog, never merged with
//! a prior version. Each menu entry is built as one in-memory block, so
//! the file never contains a partially-written entry. The emitted text is
//! the one byte-exact compatibility surface of the system: it must parse
//! in GRUB's own interpreter.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::find_dir;
use crate::strategy::{BootEntry, BootStrategy, ChainloadTarget};

/// The loader configuration directory names the bootloader installer may
/// have created under the boot partition, probed in order.
pub const CONFIG_DIR_CANDIDATES: &[&str] = &["boot/grub", "boot/grub2"];

/// Name of the emitted configuration file.
pub const CONFIG_FILE: &str = "grub.cfg";

/// Per-source asset directory (DirectKernel copies) on the boot partition.
pub const ASSET_DIR: &str = "multiso";

const PREAMBLE: &str = "\
# grub.cfg generated by multiso; regenerated from the installer catalog on every run.
set default=0
set timeout=10

";

const UTILITY_ENTRIES: &str = "\
menuentry \"Power off\" {
    halt
}

menuentry \"Reboot\" {
    reboot
}
";

/// Detect which loader configuration directory exists.
///
/// Exactly one of `boot/grub` and `boot/grub2` is created by the
/// bootloader installer; neither existing is fatal to the whole run.
pub fn config_dir(boot_mount: &Path) -> Result<PathBuf> {
    let grub = boot_mount.join(CONFIG_DIR_CANDIDATES[0]);
    let grub2 = boot_mount.join(CONFIG_DIR_CANDIDATES[1]);
    let candidates = [grub.as_path(), grub2.as_path()];
    let found = find_dir(
        &candidates,
        &format!(
            "no GRUB configuration directory under {} (looked for boot/grub and boot/grub2); \
             install the bootloader first",
            boot_mount.display()
        ),
    )?;
    Ok(found.to_path_buf())
}

/// Outcome of a DirectKernel asset copy for one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCopy {
    /// Kernel and initrd were copied to the boot partition.
    Copied,
    /// The per-source directory already holds assets; nothing written.
    AlreadyPresent,
    /// The entry is not a DirectKernel entry.
    NotApplicable,
}

/// Copy a DirectKernel entry's kernel/initrd to the boot partition.
///
/// The copy is skipped when the per-source directory already exists and
/// is non-empty, which keeps re-runs from rewriting unchanged assets.
pub fn copy_direct_kernel_assets(boot_mount: &Path, entry: &BootEntry) -> Result<AssetCopy> {
    let (kernel, initrd) = match &entry.strategy {
        BootStrategy::DirectKernel { kernel, initrd, .. } => (kernel, initrd),
        _ => return Ok(AssetCopy::NotApplicable),
    };

    let dest = boot_mount.join(ASSET_DIR).join(&entry.source);
    if dest.is_dir() && dest.read_dir()?.next().is_some() {
        return Ok(AssetCopy::AlreadyPresent);
    }
    fs::create_dir_all(&dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;

    for file in [kernel, initrd] {
        let name = file
            .file_name()
            .with_context(|| format!("{} has no file name", file.display()))?;
        fs::copy(file, dest.join(name))
            .with_context(|| format!("failed to copy {}", file.display()))?;
    }

    Ok(AssetCopy::Copied)
}

/// Boot-partition path of a DirectKernel asset, as GRUB sees it.
fn asset_path(source: &str, file: &Path) -> String {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("/{}/{}/{}", ASSET_DIR, source, name)
}

/// Re-root a kernel or initrd directive line onto the GRUB loop device.
///
/// EFI-specific and 16-bit directive spellings are normalized, and the
/// path argument gets the `(loop)` prefix unless it already names a
/// device.
fn loop_prefixed(line: &str) -> String {
    let mut tokens = line.split_whitespace();
    let command = match tokens.next() {
        Some("linuxefi") | Some("linux16") => "linux",
        Some("initrdefi") | Some("initrd16") => "initrd",
        Some(other) => other,
        None => return String::new(),
    };
    let path = match tokens.next() {
        Some(path) if path.starts_with('(') => path.to_string(),
        Some(path) => format!("(loop){}", path),
        None => return command.to_string(),
    };

    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        format!("{} {}", command, path)
    } else {
        format!("{} {} {}", command, path, rest.join(" "))
    }
}

/// The shared opening of every entry that boots out of the data partition.
fn data_partition_prologue(data_label: &str) -> String {
    format!("    search --no-floppy --set=root --label {}\n", data_label)
}

fn loopback_prologue(data_label: &str, medium_path: &str) -> String {
    format!(
        "{}    set isofile={}\n    loopback loop $isofile\n",
        data_partition_prologue(data_label),
        medium_path
    )
}

/// Render one entry as a complete menu block, or None for Unbootable.
pub fn render_entry(entry: &BootEntry, data_label: &str) -> Option<String> {
    let body = match &entry.strategy {
        BootStrategy::Unbootable { .. } => return None,

        BootStrategy::EmbeddedLoopback {
            linux_line,
            initrd_line,
        } => format!(
            "{}    {}\n    {}\n",
            loopback_prologue(data_label, &entry.medium_path),
            loop_prefixed(linux_line),
            loop_prefixed(initrd_line),
        ),

        BootStrategy::ManualLoopback {
            kernel,
            initrd,
            params,
        } => format!(
            "{}    linux (loop){} {}\n    initrd (loop){}\n",
            loopback_prologue(data_label, &entry.medium_path),
            kernel,
            params,
            initrd,
        ),

        // grub.cfg lives on the boot partition, so $root already points
        // there; no search needed.
        BootStrategy::DirectKernel {
            kernel,
            initrd,
            params,
        } => format!(
            "    linux {} {}\n    initrd {}\n",
            asset_path(&entry.source, kernel),
            params,
            asset_path(&entry.source, initrd),
        ),

        BootStrategy::Chainload {
            target: ChainloadTarget::EfiBinary { path },
        } => format!(
            "{}    chainloader {}\n",
            data_partition_prologue(data_label),
            path,
        ),

        BootStrategy::Chainload {
            target: ChainloadTarget::ImageLoopback { efi_path },
        } => format!(
            "{}    chainloader (loop){}\n",
            loopback_prologue(data_label, &entry.medium_path),
            efi_path,
        ),
    };

    Some(format!("menuentry \"{}\" {{\n{}}}\n", entry.title, body))
}

/// Render the whole configuration document.
///
/// Deterministic for a given entry list: preamble, one block per
/// bootable entry in catalog order, then the fixed utility entries.
pub fn render_document(entries: &[BootEntry], data_label: &str) -> String {
    let mut doc = String::from(PREAMBLE);
    for entry in entries {
        if let Some(block) = render_entry(entry, data_label) {
            doc.push_str(&block);
            doc.push('\n');
        }
    }
    doc.push_str(UTILITY_ENTRIES);
    doc
}

/// Write the document into the loader configuration directory.
pub fn write_config(config_dir: &Path, document: &str) -> Result<PathBuf> {
    let path = config_dir.join(CONFIG_FILE);
    fs::write(&path, document)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(strategy: BootStrategy) -> BootEntry {
        BootEntry {
            title: "Ubuntu (ubuntu-24.04)".to_string(),
            source: "ubuntu-24.04".to_string(),
            medium_path: "/iso/ubuntu-24.04.iso".to_string(),
            strategy,
        }
    }

    #[test]
    fn test_loop_prefixed() {
        assert_eq!(
            loop_prefixed("linux /casper/vmlinuz quiet splash"),
            "linux (loop)/casper/vmlinuz quiet splash"
        );
        assert_eq!(
            loop_prefixed("linuxefi /boot/vmlinuz rd.live.image"),
            "linux (loop)/boot/vmlinuz rd.live.image"
        );
        assert_eq!(
            loop_prefixed("initrd (loop)/casper/initrd"),
            "initrd (loop)/casper/initrd"
        );
    }

    #[test]
    fn test_render_manual_loopback_entry() {
        let block = render_entry(
            &entry(BootStrategy::ManualLoopback {
                kernel: "/casper/vmlinuz".to_string(),
                initrd: "/casper/initrd".to_string(),
                params: "boot=casper iso-scan/filename=/iso/ubuntu-24.04.iso quiet splash ---"
                    .to_string(),
            }),
            "MULTISO",
        )
        .unwrap();

        assert!(block.starts_with("menuentry \"Ubuntu (ubuntu-24.04)\" {\n"));
        assert!(block.contains("search --no-floppy --set=root --label MULTISO"));
        assert!(block.contains("set isofile=/iso/ubuntu-24.04.iso"));
        assert!(block.contains("loopback loop $isofile"));
        assert!(block.contains(
            "linux (loop)/casper/vmlinuz boot=casper iso-scan/filename=/iso/ubuntu-24.04.iso"
        ));
        assert!(block.contains("initrd (loop)/casper/initrd"));
        assert!(block.ends_with("}\n"));
    }

    #[test]
    fn test_render_direct_kernel_entry_has_no_search() {
        let block = render_entry(
            &entry(BootStrategy::DirectKernel {
                kernel: PathBuf::from("/data/fedora-40/isolinux/vmlinuz"),
                initrd: PathBuf::from("/data/fedora-40/isolinux/initrd.img"),
                params: "rd.live.image quiet".to_string(),
            }),
            "MULTISO",
        )
        .unwrap();

        assert!(block.contains("linux /multiso/ubuntu-24.04/vmlinuz rd.live.image quiet"));
        assert!(block.contains("initrd /multiso/ubuntu-24.04/initrd.img"));
        assert!(!block.contains("search"));
    }

    #[test]
    fn test_render_chainload_entries() {
        let tree = render_entry(
            &entry(BootStrategy::Chainload {
                target: ChainloadTarget::EfiBinary {
                    path: "/WindowsToGo/EFI/BOOT/BOOTX64.EFI".to_string(),
                },
            }),
            "MULTISO",
        )
        .unwrap();
        assert!(tree.contains("chainloader /WindowsToGo/EFI/BOOT/BOOTX64.EFI"));
        assert!(!tree.contains("loopback"));

        let image = render_entry(
            &entry(BootStrategy::Chainload {
                target: ChainloadTarget::ImageLoopback {
                    efi_path: "/efi/boot/bootx64.efi".to_string(),
                },
            }),
            "MULTISO",
        )
        .unwrap();
        assert!(image.contains("loopback loop $isofile"));
        assert!(image.contains("chainloader (loop)/efi/boot/bootx64.efi"));
    }

    #[test]
    fn test_unbootable_renders_nothing() {
        assert!(render_entry(
            &entry(BootStrategy::Unbootable {
                reason: "no kernel".to_string()
            }),
            "MULTISO",
        )
        .is_none());
    }

    #[test]
    fn test_document_has_preamble_and_utility_entries() {
        let doc = render_document(&[], "MULTISO");
        assert!(doc.starts_with("# grub.cfg generated by multiso"));
        assert!(doc.contains("set default=0"));
        assert!(doc.contains("set timeout=10"));
        assert!(doc.contains("menuentry \"Power off\" {\n    halt\n}"));
        assert!(doc.contains("menuentry \"Reboot\" {\n    reboot\n}"));
    }
}

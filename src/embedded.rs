//! Embedded boot-configuration extraction from installer images.
//!
//! Images are loop-mounted read-only and probed for the configuration
//! the publisher shipped inside. The probe only reads the config content
//! out of the mount; the mount is released before the content is parsed,
//! and tree probing is separated from mounting so the logic can be
//! exercised against a plain directory.

use std::fs;
use std::path::Path;

use crate::mount::ScopedMount;
use crate::rewrite::{rewrite_kernel_line, RewriteCtx};

/// Conventional in-image configuration locations, probed in order.
///
/// `loopback.cfg` is the configuration publishers author specifically for
/// loop-mounted boots, so it comes first.
pub const CONFIG_PATHS: &[&str] = &[
    "boot/grub/loopback.cfg",
    "boot/grub/grub.cfg",
    "EFI/BOOT/grub.cfg",
    "EFI/boot/grub.cfg",
];

/// Outcome of probing an image for an embedded boot configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddedConfig {
    /// A genuine configuration was found; the kernel line is already
    /// rewritten for the multiboot medium.
    Found {
        linux_line: String,
        initrd_line: String,
    },
    /// No configuration at any conventional location.
    NotFound,
    /// A configuration that only redirects to another file, with no boot
    /// directives of its own.
    Decoy { config: String },
    /// A configuration missing the kernel or initrd directive.
    Incomplete { config: String },
    /// The image layout cannot be loop-booted at all; the caller must not
    /// fall back to any loopback strategy.
    Broken { reason: &'static str },
}

/// What the filesystem probe found, before any parsing.
enum RawProbe {
    Broken { reason: &'static str },
    NotFound,
    Config { rel: &'static str, content: String },
}

/// Mount an installer image and probe it for an embedded configuration.
///
/// A failed mount is reported as NotFound (with a diagnostic): an image
/// that cannot be inspected simply has no usable embedded configuration.
/// The mount is released before the extracted content is parsed, on
/// every path.
pub fn inspect_image(image: &Path, mountpoint: &Path, ctx: &RewriteCtx) -> EmbeddedConfig {
    let mount = match ScopedMount::loop_image(image, mountpoint) {
        Ok(mount) => mount,
        Err(e) => {
            eprintln!("  [WARN] cannot inspect {}: {:#}", image.display(), e);
            return EmbeddedConfig::NotFound;
        }
    };

    let raw = probe_tree(mount.path());

    if let Err(e) = mount.release() {
        eprintln!("  [WARN] {:#}", e);
    }

    classify_probe(raw, ctx)
}

/// Probe a plain directory tree the way a mounted image is probed.
pub fn inspect_tree(root: &Path, ctx: &RewriteCtx) -> EmbeddedConfig {
    classify_probe(probe_tree(root), ctx)
}

/// Filesystem phase: layout checks, then the ordered config-path search.
/// Reads the winning file's content out so no parsing needs the mount.
fn probe_tree(root: &Path) -> RawProbe {
    if let Some(reason) = detect_broken_layout(root) {
        return RawProbe::Broken { reason };
    }

    for rel in CONFIG_PATHS.iter().copied() {
        let path = root.join(rel);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(content) => return RawProbe::Config { rel, content },
            Err(e) => {
                eprintln!("  [WARN] failed to read {}: {}", path.display(), e);
                continue;
            }
        }
    }

    RawProbe::NotFound
}

/// Parsing phase, run after the mount is gone.
fn classify_probe(raw: RawProbe, ctx: &RewriteCtx) -> EmbeddedConfig {
    let (rel, content) = match raw {
        RawProbe::Broken { reason } => return EmbeddedConfig::Broken { reason },
        RawProbe::NotFound => return EmbeddedConfig::NotFound,
        RawProbe::Config { rel, content } => (rel, content),
    };

    if is_decoy(&content) {
        return EmbeddedConfig::Decoy {
            config: rel.to_string(),
        };
    }

    match extract_boot_lines(&content) {
        Some((linux_line, initrd_line)) => EmbeddedConfig::Found {
            linux_line: rewrite_kernel_line(&linux_line, ctx),
            initrd_line,
        },
        None => EmbeddedConfig::Incomplete {
            config: rel.to_string(),
        },
    }
}

/// Probe for image layouts known to break under loopback boot.
fn detect_broken_layout(root: &Path) -> Option<&'static str> {
    // Two loader kernels in one image: GRUB's loopback picks the wrong one.
    if root.join("isolinux/linux").is_file() && root.join("boot/x86_64/loader/linux").is_file() {
        return Some("dual kernel loader layout");
    }

    // A monolithic installer image without a live root cannot find its
    // stage-2 payload once loop-mounted from a secondary medium.
    if root.join("images/install.img").is_file() && !root.join("LiveOS/squashfs.img").is_file() {
        return Some("monolithic installer image, no live root");
    }

    None
}

fn directive(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

fn is_kernel_directive(word: &str) -> bool {
    matches!(word, "linux" | "linuxefi" | "linux16")
}

fn is_initrd_directive(word: &str) -> bool {
    matches!(word, "initrd" | "initrdefi" | "initrd16")
}

/// A decoy only redirects elsewhere: it has `source`/`configfile`
/// directives but no kernel invocation of its own.
fn is_decoy(content: &str) -> bool {
    let mut has_redirect = false;
    for line in content.lines() {
        match directive(line.trim()) {
            Some(word) if is_kernel_directive(word) => return false,
            Some("source") | Some("configfile") => has_redirect = true,
            _ => {}
        }
    }
    has_redirect
}

/// Extract the first kernel-invocation line and first initrd line.
fn extract_boot_lines(content: &str) -> Option<(String, String)> {
    let mut linux_line = None;
    let mut initrd_line = None;

    for line in content.lines() {
        let trimmed = line.trim();
        match directive(trimmed) {
            Some(word) if is_kernel_directive(word) && linux_line.is_none() => {
                linux_line = Some(trimmed.to_string());
            }
            Some(word) if is_initrd_directive(word) && initrd_line.is_none() => {
                initrd_line = Some(trimmed.to_string());
            }
            _ => {}
        }
    }

    Some((linux_line?, initrd_line?))
}

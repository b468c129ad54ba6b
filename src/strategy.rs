//! Boot-strategy resolution.
//!
//! Exactly one strategy is resolved per source, as a total function of
//! (family, kind, probe results). Resolution never depends on other
//! sources, so the outcome for a given source is the same whatever else
//! is in the catalog.

use std::path::{Path, PathBuf};

use crate::catalog::{InstallerSource, SourceKind};
use crate::chainload;
use crate::config::Config;
use crate::embedded::{self, EmbeddedConfig};
use crate::family::{self, OsFamily};
use crate::locate::{self, KernelPair};
use crate::rewrite::RewriteCtx;
use crate::template::TemplateTable;

/// Where a chainload entry hands control to.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainloadTarget {
    /// A firmware binary on the data partition (extracted tree).
    EfiBinary { path: String },
    /// A firmware binary inside a GRUB loopback of the image.
    ImageLoopback { efi_path: String },
}

/// How one source will be booted.
#[derive(Debug, Clone, PartialEq)]
pub enum BootStrategy {
    /// Reuse the image's own boot directives, rewritten for the medium.
    EmbeddedLoopback {
        linux_line: String,
        initrd_line: String,
    },
    /// Family-template kernel/initrd paths inside the loop-mounted image.
    ManualLoopback {
        kernel: String,
        initrd: String,
        params: String,
    },
    /// Kernel/initrd copied out to the boot partition.
    DirectKernel {
        kernel: PathBuf,
        initrd: PathBuf,
        params: String,
    },
    /// Hand control to another firmware-level bootloader.
    Chainload { target: ChainloadTarget },
    /// No viable strategy; the source is skipped with a diagnostic.
    Unbootable { reason: String },
}

impl BootStrategy {
    /// Short label for progress output.
    pub fn describe(&self) -> &'static str {
        match self {
            BootStrategy::EmbeddedLoopback { .. } => "embedded loopback configuration",
            BootStrategy::ManualLoopback { .. } => "manual loopback template",
            BootStrategy::DirectKernel { .. } => "direct kernel boot",
            BootStrategy::Chainload {
                target: ChainloadTarget::ImageLoopback { .. },
            } => "EFI chainload through image loopback",
            BootStrategy::Chainload { .. } => "EFI chainload",
            BootStrategy::Unbootable { .. } => "unbootable",
        }
    }
}

/// Filesystem probe results feeding resolution for one source.
#[derive(Debug, Default)]
pub struct SourceProbe {
    /// Extractor outcome; only populated for non-Windows image sources.
    pub embedded: Option<EmbeddedConfig>,
    /// Locator outcome; only populated for non-Windows tree sources.
    pub kernel_pair: Option<KernelPair>,
    /// Chainload target; only populated for Windows tree sources.
    pub chainload: Option<String>,
}

/// The rendered output unit: one menu entry for one source.
#[derive(Debug, Clone)]
pub struct BootEntry {
    /// Display string for the menu.
    pub title: String,
    /// Source name, used for per-source asset directories and diagnostics.
    pub source: String,
    /// The source's path as GRUB sees it from the data partition root.
    pub medium_path: String,
    pub strategy: BootStrategy,
}

/// Run the filesystem probes a source's (kind, family) calls for.
pub fn probe_source(
    source: &InstallerSource,
    family: OsFamily,
    config: &Config,
    scratch: &Path,
) -> SourceProbe {
    let mut probe = SourceProbe::default();

    match (source.kind, family.is_windows()) {
        // Chainloads through the image loopback; nothing to probe.
        (SourceKind::Image, true) => {}
        (SourceKind::Image, false) => {
            let ctx = RewriteCtx {
                iso_path: source.medium_path.clone(),
                volume_label: config.data_label.clone(),
            };
            probe.embedded = Some(embedded::inspect_image(&source.path, scratch, &ctx));
        }
        (SourceKind::ExtractedTree, true) => {
            match chainload::resolve_chainload(&source.path, &source.medium_path) {
                Ok(target) => probe.chainload = target,
                Err(e) => {
                    eprintln!("  [WARN] {}: chainload probe failed: {:#}", source.name, e);
                }
            }
        }
        (SourceKind::ExtractedTree, false) => {
            probe.kernel_pair = locate::find_kernel_pair(&source.path);
        }
    }

    probe
}

/// Resolve the boot strategy for one source from its probe results.
pub fn resolve(
    source: &InstallerSource,
    family: OsFamily,
    probe: &SourceProbe,
    templates: &TemplateTable,
    data_label: &str,
) -> BootStrategy {
    if family.is_windows() {
        return match source.kind {
            SourceKind::Image => BootStrategy::Chainload {
                target: ChainloadTarget::ImageLoopback {
                    efi_path: "/efi/boot/bootx64.efi".to_string(),
                },
            },
            SourceKind::ExtractedTree => match &probe.chainload {
                Some(path) => BootStrategy::Chainload {
                    target: ChainloadTarget::EfiBinary { path: path.clone() },
                },
                None => BootStrategy::Unbootable {
                    reason: "no EFI boot loader found in tree".to_string(),
                },
            },
        };
    }

    match source.kind {
        SourceKind::Image => match &probe.embedded {
            Some(EmbeddedConfig::Broken { reason }) => BootStrategy::Unbootable {
                reason: format!("broken loopback layout: {}", reason),
            },
            // The image author's own directives beat any template: they
            // survive distro updates that change internal paths.
            Some(EmbeddedConfig::Found {
                linux_line,
                initrd_line,
            }) => BootStrategy::EmbeddedLoopback {
                linux_line: linux_line.clone(),
                initrd_line: initrd_line.clone(),
            },
            // Absent, decoy, or unparseable: fall back to the template.
            _ => manual_loopback(source, family, templates, data_label),
        },
        SourceKind::ExtractedTree => match &probe.kernel_pair {
            Some(pair) => {
                let template = templates.for_family(family);
                BootStrategy::DirectKernel {
                    kernel: pair.kernel.clone(),
                    initrd: pair.initrd.clone(),
                    params: template.render_params(&source.medium_path, data_label),
                }
            }
            None => BootStrategy::Unbootable {
                reason: "no co-located kernel/initrd pair found".to_string(),
            },
        },
    }
}

fn manual_loopback(
    source: &InstallerSource,
    family: OsFamily,
    templates: &TemplateTable,
    data_label: &str,
) -> BootStrategy {
    let template = templates.for_family(family);
    BootStrategy::ManualLoopback {
        kernel: template.kernel.clone(),
        initrd: template.initrd.clone(),
        params: template.render_params(&source.medium_path, data_label),
    }
}

/// Classify, probe, and resolve one source into its menu entry.
pub fn resolve_source(
    source: &InstallerSource,
    config: &Config,
    templates: &TemplateTable,
    scratch: &Path,
) -> BootEntry {
    let family = family::classify(&source.name);
    let probe = probe_source(source, family, config, scratch);
    let strategy = resolve(source, family, &probe, templates, &config.data_label);

    BootEntry {
        title: entry_title(family, &source.name),
        source: source.name.clone(),
        medium_path: source.medium_path.clone(),
        strategy,
    }
}

fn entry_title(family: OsFamily, name: &str) -> String {
    match family {
        OsFamily::Unknown => name.to_string(),
        _ => format!("{} ({})", family.display_name(), name),
    }
}

//! Generate command - resolves the catalog and writes grub.cfg.

use anyhow::{bail, Result};
use std::env;
use std::time::Instant;

use crate::catalog;
use crate::common::{cleanup_work_dir, prepare_work_dir};
use crate::config::Config;
use crate::grub::{self, AssetCopy};
use crate::strategy::{self, BootStrategy};
use crate::template::TemplateTable;

/// Execute the generate command.
///
/// With `dry_run`, the rendered document goes to stdout and no assets are
/// copied; the medium is left untouched.
pub fn cmd_generate(config: &Config, dry_run: bool) -> Result<()> {
    let start = Instant::now();
    println!("=== multiso: generating boot entries ===\n");

    // Environment errors are the only fatal class.
    if !config.boot_mount.is_dir() {
        bail!(
            "boot partition not mounted at {}",
            config.boot_mount.display()
        );
    }
    if !config.data_mount.is_dir() {
        bail!(
            "data partition not mounted at {}",
            config.data_mount.display()
        );
    }
    let grub_dir = grub::config_dir(&config.boot_mount)?;

    let templates = TemplateTable::load(config.templates_path.as_deref())?;

    let sources = catalog::scan(config)?;
    if sources.is_empty() {
        println!(
            "No installer sources found under {}",
            config.data_mount.display()
        );
    }

    let scratch = prepare_work_dir(&env::temp_dir(), "multiso-inspect")?;

    let mut entries = Vec::new();
    for source in &sources {
        let entry = strategy::resolve_source(source, config, &templates, &scratch);
        match &entry.strategy {
            BootStrategy::Unbootable { reason } => {
                println!("  [SKIP] {}: {}", entry.source, reason);
            }
            other => println!("  [ok] {}: {}", entry.source, other.describe()),
        }
        entries.push(entry);
    }

    cleanup_work_dir(&scratch);

    if !dry_run {
        for entry in &mut entries {
            match grub::copy_direct_kernel_assets(&config.boot_mount, entry) {
                Ok(AssetCopy::Copied) => {
                    println!("  copied kernel/initrd for {}", entry.source);
                }
                Ok(AssetCopy::AlreadyPresent) => {
                    println!(
                        "  kernel/initrd for {} already present, skipping copy",
                        entry.source
                    );
                }
                Ok(AssetCopy::NotApplicable) => {}
                // A failed copy downgrades the source; the run continues.
                Err(e) => {
                    eprintln!("  [WARN] {}: {:#}", entry.source, e);
                    entry.strategy = BootStrategy::Unbootable {
                        reason: format!("failed to copy boot assets: {:#}", e),
                    };
                }
            }
        }
    }

    let document = grub::render_document(&entries, &config.data_label);

    if dry_run {
        println!("\n{}", document);
    } else {
        let path = grub::write_config(&grub_dir, &document)?;
        println!("\nWrote {}", path.display());
    }

    let bootable = entries
        .iter()
        .filter(|e| !matches!(e.strategy, BootStrategy::Unbootable { .. }))
        .count();
    println!(
        "{} of {} sources bootable ({:.1}s)",
        bootable,
        entries.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

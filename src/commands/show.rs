//! Show command - displays information without touching the medium.

use anyhow::Result;
use std::env;

use crate::catalog::{self, SourceKind};
use crate::common::{cleanup_work_dir, prepare_work_dir};
use crate::config::Config;
use crate::grub;
use crate::strategy;
use crate::template::TemplateTable;

/// Show target for the show command.
pub enum ShowTarget {
    /// List discovered installer sources
    Catalog,
    /// Resolve and display the boot strategy per source
    Strategies,
    /// Show current configuration
    Config,
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget) -> Result<()> {
    match target {
        ShowTarget::Catalog => show_catalog(config),
        ShowTarget::Strategies => show_strategies(config),
        ShowTarget::Config => show_config(config),
    }
}

fn show_catalog(config: &Config) -> Result<()> {
    let sources = catalog::scan(config)?;

    if sources.is_empty() {
        println!(
            "No installer sources found under {}",
            config.data_mount.display()
        );
        return Ok(());
    }

    println!("Installer sources on {}:", config.data_mount.display());
    for source in &sources {
        let kind = match source.kind {
            SourceKind::Image => "image",
            SourceKind::ExtractedTree => "tree ",
        };
        println!("  [{}] {}  ({})", kind, source.name, source.medium_path);
    }

    Ok(())
}

fn show_strategies(config: &Config) -> Result<()> {
    let templates = TemplateTable::load(config.templates_path.as_deref())?;
    let sources = catalog::scan(config)?;
    let scratch = prepare_work_dir(&env::temp_dir(), "multiso-inspect")?;

    for source in &sources {
        let entry = strategy::resolve_source(source, config, &templates, &scratch);
        println!("  {}: {}", entry.source, entry.strategy.describe());
    }

    cleanup_work_dir(&scratch);
    Ok(())
}

fn show_config(config: &Config) -> Result<()> {
    config.print();
    match grub::config_dir(&config.boot_mount) {
        Ok(dir) => println!("  GRUB config directory: {}", dir.display()),
        Err(_) => println!("  GRUB config directory: NOT FOUND (install the bootloader first)"),
    }
    Ok(())
}

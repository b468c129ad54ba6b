//! Clean command - removes generated output from the medium.

use anyhow::Result;
use std::fs;

use crate::config::Config;
use crate::grub;

/// Clean target for the clean command.
pub enum CleanTarget {
    /// Copied DirectKernel assets only
    Entries,
    /// The generated grub.cfg only
    Config,
    /// Both
    All,
}

/// Execute the clean command.
pub fn cmd_clean(config: &Config, target: CleanTarget) -> Result<()> {
    match target {
        CleanTarget::Entries => clean_entries(config),
        CleanTarget::Config => clean_config(config),
        CleanTarget::All => {
            clean_entries(config)?;
            clean_config(config)
        }
    }
}

fn clean_entries(config: &Config) -> Result<()> {
    let assets = config.boot_mount.join(grub::ASSET_DIR);

    if assets.is_dir() {
        println!("Removing {}...", assets.display());
        fs::remove_dir_all(&assets)?;
        println!("Copied boot assets removed.");
    } else {
        println!("No copied boot assets to clean.");
    }

    Ok(())
}

fn clean_config(config: &Config) -> Result<()> {
    // A missing config directory just means there is nothing to clean.
    let dir = match grub::config_dir(&config.boot_mount) {
        Ok(dir) => dir,
        Err(_) => {
            println!("No GRUB configuration directory; nothing to clean.");
            return Ok(());
        }
    };

    let cfg = dir.join(grub::CONFIG_FILE);
    if cfg.is_file() {
        println!("Removing {}...", cfg.display());
        fs::remove_file(&cfg)?;
        println!("Generated configuration removed.");
    } else {
        println!("No generated configuration to clean.");
    }

    Ok(())
}

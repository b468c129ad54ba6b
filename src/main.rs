//! Multiso - multiboot USB menu generator.
//!
//! Given a data partition holding installer images and extracted
//! installer trees, resolves how each one can be booted and writes a
//! single GRUB menu covering all of them:
//! - embedded loopback (the image's own boot directives, rewritten)
//! - manual loopback (per-family kernel/initrd templates)
//! - direct kernel boot (kernel/initrd copied to the boot partition)
//! - EFI chainload (Windows)

use anyhow::Result;
use clap::{Parser, Subcommand};

use multiso::commands;
use multiso::config::Config;

#[derive(Parser)]
#[command(name = "multiso")]
#[command(about = "Multiboot USB menu generator")]
#[command(
    after_help = "QUICK START:\n  multiso preflight        Check the target medium\n  multiso generate         Scan installers and write grub.cfg\n  multiso show strategies  Preview boot strategies without writing"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the installer catalog and write the GRUB configuration
    Generate {
        /// Print the configuration instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Run preflight checks (verify the medium before generating)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Remove generated configuration and copied boot assets
    Clean {
        #[command(subcommand)]
        what: Option<CleanTarget>,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// List discovered installer sources
    Catalog,
    /// Resolve and display the boot strategy per source
    Strategies,
    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum CleanTarget {
    /// Remove copied kernel/initrd assets only
    Entries,
    /// Remove the generated grub.cfg only
    Config,
    /// Remove everything multiso wrote to the medium
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();

    match cli.command {
        Commands::Generate { dry_run } => {
            commands::cmd_generate(&config, dry_run)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Catalog => commands::show::ShowTarget::Catalog,
                ShowTarget::Strategies => commands::show::ShowTarget::Strategies,
                ShowTarget::Config => commands::show::ShowTarget::Config,
            };
            commands::cmd_show(&config, show_target)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&config, strict)?;
        }

        Commands::Clean { what } => {
            let clean_target = match what {
                None => commands::clean::CleanTarget::Config,
                Some(CleanTarget::Entries) => commands::clean::CleanTarget::Entries,
                Some(CleanTarget::Config) => commands::clean::CleanTarget::Config,
                Some(CleanTarget::All) => commands::clean::CleanTarget::All,
            };
            commands::cmd_clean(&config, clean_target)?;
        }
    }

    Ok(())
}

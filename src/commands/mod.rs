//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `generate` - Scan the catalog and write the GRUB configuration
//! - `show` - Display catalog, strategies, or configuration
//! - `preflight` - Run environment checks
//! - `clean` - Remove generated configuration and copied assets

pub mod clean;
pub mod generate;
mod preflight;
pub mod show;

pub use clean::cmd_clean;
pub use generate::cmd_generate;
pub use preflight::cmd_preflight;
pub use show::cmd_show;

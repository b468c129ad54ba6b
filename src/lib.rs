//! Multiso library exports.
//!
//! The binary in `main.rs` and the integration tests in `tests/` share
//! these modules.

pub mod catalog;
pub mod chainload;
pub mod commands;
pub mod common;
pub mod config;
pub mod embedded;
pub mod family;
pub mod grub;
pub mod locate;
pub mod mount;
pub mod preflight;
pub mod process;
pub mod rewrite;
pub mod strategy;
pub mod template;

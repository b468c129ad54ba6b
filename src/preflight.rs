//! Preflight checks for the target medium.
//!
//! Validates the environment before a generate run: partitions mounted,
//! loader configuration directory present, host tools available. Run with
//! `multiso preflight` to check everything is ready.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::grub;
use crate::process;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - the run will fail.
    Fail,
    /// Check passed but with a warning.
    Warn,
}

impl CheckResult {
    fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: None,
        }
    }

    fn pass_with(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details.to_string()),
        }
    }

    fn fail(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details.to_string()),
        }
    }

    fn warn(name: &str, details: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details.to_string()),
        }
    }
}

/// Results of all preflight checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if all checks passed (no failures).
    pub fn all_passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// Count of failed checks.
    pub fn fail_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status_str = match check.status {
                CheckStatus::Pass => "PASS",
                CheckStatus::Fail => "FAIL",
                CheckStatus::Warn => "WARN",
            };

            print!("  [{}] {}", status_str, check.name);
            if let Some(details) = &check.details {
                println!(": {}", details);
            } else {
                println!();
            }
        }

        println!();
        let total = self.checks.len();
        let passed = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Pass)
            .count();
        let failed = self.fail_count();

        println!("Summary: {}/{} passed", passed, total);
        if failed > 0 {
            println!("         {} FAILED - generate will not succeed", failed);
        }
    }
}

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    checks.push(check_mountpoint("boot partition", &config.boot_mount));
    checks.push(check_mountpoint("data partition", &config.data_mount));
    checks.push(check_config_dir(config));
    checks.push(check_iso_dir(config));
    checks.extend(check_host_tools());
    checks.push(check_root());

    PreflightReport { checks }
}

/// Run preflight and fail with an error if any check fails.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();
    if !report.all_passed() {
        bail!("preflight failed: {} check(s) failed", report.fail_count());
    }
    Ok(())
}

fn check_mountpoint(name: &str, path: &std::path::Path) -> CheckResult {
    if path.is_dir() {
        CheckResult::pass_with(name, &path.display().to_string())
    } else {
        CheckResult::fail(
            name,
            &format!("{} does not exist; mount the medium first", path.display()),
        )
    }
}

fn check_config_dir(config: &Config) -> CheckResult {
    match grub::config_dir(&config.boot_mount) {
        Ok(dir) => CheckResult::pass_with("GRUB config directory", &dir.display().to_string()),
        Err(e) => CheckResult::fail("GRUB config directory", &format!("{}", e)),
    }
}

fn check_iso_dir(config: &Config) -> CheckResult {
    let iso_root = config.iso_root();
    if iso_root.is_dir() {
        CheckResult::pass_with("iso directory", &iso_root.display().to_string())
    } else {
        CheckResult::warn(
            "iso directory",
            &format!(
                "{} does not exist; no image sources will be found",
                iso_root.display()
            ),
        )
    }
}

fn check_host_tools() -> Vec<CheckResult> {
    let mut results = Vec::new();

    for tool in ["mount", "umount"] {
        match which::which(tool) {
            Ok(path) => {
                results.push(CheckResult::pass_with(tool, &path.display().to_string()))
            }
            Err(_) => results.push(CheckResult::fail(
                tool,
                "not found in PATH; required for image inspection",
            )),
        }
    }

    results
}

fn check_root() -> CheckResult {
    match process::run("id", ["-u"]) {
        Ok(result) if result.stdout_trimmed() == "0" => CheckResult::pass("running as root"),
        Ok(_) => CheckResult::warn(
            "running as root",
            "loop-mounting installer images requires root; \
             images will fall back to manual templates",
        ),
        Err(_) => CheckResult::warn("running as root", "could not determine effective uid"),
    }
}

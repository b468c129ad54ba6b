//! Manual loopback boot templates per OS family.
//!
//! These encode kernel/initrd paths and parameter strings validated
//! empirically against specific distribution releases, which makes them
//! the part of the system most likely to need adjustment as distributions
//! evolve. They are therefore data, not code: the built-in table can be
//! partially overridden by a JSON file named in `MULTISO_TEMPLATES`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::family::OsFamily;

/// Kernel/initrd paths inside a loop-mounted image, plus the parameter
/// string. `{iso}` expands to the source's medium path, `{label}` to the
/// data partition label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoopbackTemplate {
    pub kernel: String,
    pub initrd: String,
    pub params: String,
}

impl LoopbackTemplate {
    /// Render the parameter string for a concrete source.
    pub fn render_params(&self, iso_path: &str, label: &str) -> String {
        self.params.replace("{iso}", iso_path).replace("{label}", label)
    }
}

/// Partial override file: only the named families are replaced.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateOverrides {
    casper: Option<LoopbackTemplate>,
    redhat: Option<LoopbackTemplate>,
    opensuse: Option<LoopbackTemplate>,
    arch: Option<LoopbackTemplate>,
}

/// The full per-family template table.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    pub casper: LoopbackTemplate,
    pub redhat: LoopbackTemplate,
    pub opensuse: LoopbackTemplate,
    pub arch: LoopbackTemplate,
}

impl TemplateTable {
    /// The built-in defaults.
    pub fn builtin() -> Self {
        Self {
            casper: LoopbackTemplate {
                kernel: "/casper/vmlinuz".to_string(),
                initrd: "/casper/initrd".to_string(),
                params: "boot=casper iso-scan/filename={iso} quiet splash ---".to_string(),
            },
            redhat: LoopbackTemplate {
                kernel: "/isolinux/vmlinuz".to_string(),
                initrd: "/isolinux/initrd.img".to_string(),
                params: "iso-scan/filename={iso} root=live:LABEL={label} rd.live.image quiet"
                    .to_string(),
            },
            opensuse: LoopbackTemplate {
                kernel: "/boot/x86_64/loader/linux".to_string(),
                initrd: "/boot/x86_64/loader/initrd".to_string(),
                params:
                    "isofrom_device=/dev/disk/by-label/{label} isofrom_system={iso} splash=silent"
                        .to_string(),
            },
            arch: LoopbackTemplate {
                kernel: "/arch/boot/x86_64/vmlinuz-linux".to_string(),
                initrd: "/arch/boot/x86_64/initramfs-linux.img".to_string(),
                params: "img_dev=/dev/disk/by-label/{label} img_loop={iso} earlymodules=loop"
                    .to_string(),
            },
        }
    }

    /// Load the table, applying overrides from the given JSON file if any.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut table = Self::builtin();

        if let Some(path) = path {
            let content = fs::read_to_string(path).with_context(|| {
                format!("failed to read template override file {}", path.display())
            })?;
            let overrides: TemplateOverrides = serde_json::from_str(&content)
                .with_context(|| format!("invalid template override file {}", path.display()))?;

            if let Some(t) = overrides.casper {
                table.casper = t;
            }
            if let Some(t) = overrides.redhat {
                table.redhat = t;
            }
            if let Some(t) = overrides.opensuse {
                table.opensuse = t;
            }
            if let Some(t) = overrides.arch {
                table.arch = t;
            }
        }

        Ok(table)
    }

    /// The template used for a family's manual loopback fallback.
    ///
    /// Ubuntu and Debian share the casper template; Unknown uses it as the
    /// best-effort default. Windows families never reach this path.
    pub fn for_family(&self, family: OsFamily) -> &LoopbackTemplate {
        match family {
            OsFamily::RedHat => &self.redhat,
            OsFamily::OpenSuse => &self.opensuse,
            OsFamily::Arch => &self.arch,
            _ => &self.casper,
        }
    }
}

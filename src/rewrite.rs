//! Boot-parameter rewrite rules.
//!
//! An embedded configuration was authored for the original install medium:
//! its kernel line names the publisher's own ISO path and volume label.
//! These rules rewrite those tokens so the directive becomes valid for the
//! multiboot medium. The table is applied token-wise in a fixed order;
//! each rule is independently testable.

/// Values substituted into rewritten tokens.
#[derive(Debug, Clone)]
pub struct RewriteCtx {
    /// Path of the installer image on the data partition, e.g.
    /// `/iso/ubuntu-24.04.iso`.
    pub iso_path: String,
    /// Filesystem label of the data partition.
    pub volume_label: String,
}

/// What a rewritten token's value is computed from.
#[derive(Debug, Clone, Copy)]
enum Value {
    /// The source's path on the medium.
    IsoPath,
    /// The medium's volume label.
    Label,
    /// A /dev/disk/by-label device path for the medium.
    LabelDevice,
}

impl Value {
    fn render(self, ctx: &RewriteCtx) -> String {
        match self {
            Value::IsoPath => ctx.iso_path.clone(),
            Value::Label => ctx.volume_label.clone(),
            Value::LabelDevice => format!("/dev/disk/by-label/{}", ctx.volume_label),
        }
    }
}

/// One rewrite rule: a token matching `matches` is replaced by
/// `replaces_with` + the rendered value.
struct Rule {
    matches: &'static str,
    replaces_with: &'static str,
    value: Value,
}

const RULES: &[Rule] = &[
    // casper (Ubuntu) and debian-live ISO scan parameters
    Rule {
        matches: "iso-scan/filename=",
        replaces_with: "iso-scan/filename=",
        value: Value::IsoPath,
    },
    Rule {
        matches: "findiso=",
        replaces_with: "findiso=",
        value: Value::IsoPath,
    },
    // archiso loopback parameters
    Rule {
        matches: "img_loop=",
        replaces_with: "img_loop=",
        value: Value::IsoPath,
    },
    Rule {
        matches: "img_dev=",
        replaces_with: "img_dev=",
        value: Value::LabelDevice,
    },
    Rule {
        matches: "archisolabel=",
        replaces_with: "archisolabel=",
        value: Value::Label,
    },
    // dracut live boot: the publisher's CD label becomes the medium's label
    Rule {
        matches: "root=live:CDLABEL=",
        replaces_with: "root=live:LABEL=",
        value: Value::Label,
    },
    // openSUSE isofrom parameters
    Rule {
        matches: "isofrom_system=",
        replaces_with: "isofrom_system=",
        value: Value::IsoPath,
    },
    Rule {
        matches: "isofrom_device=",
        replaces_with: "isofrom_device=",
        value: Value::LabelDevice,
    },
];

/// Rewrite one token if any rule matches it; first matching rule wins.
fn rewrite_token(token: &str, ctx: &RewriteCtx) -> String {
    for rule in RULES {
        if token.starts_with(rule.matches) {
            return format!("{}{}", rule.replaces_with, rule.value.render(ctx));
        }
    }
    token.to_string()
}

/// Rewrite an extracted kernel invocation line for the multiboot medium.
///
/// Whitespace is normalized to single spaces; token order is preserved.
pub fn rewrite_kernel_line(line: &str, ctx: &RewriteCtx) -> String {
    line.split_whitespace()
        .map(|token| rewrite_token(token, ctx))
        .collect::<Vec<_>>()
        .join(" ")
}

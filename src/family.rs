//! OS family classification from installer source names.
//!
//! Classification is a pure function over an ordered rule table. More
//! specific markers (e.g. "win11") are listed before generic ones
//! ("windows") so they are never shadowed, regardless of what else the
//! name contains.

/// Closed set of OS families the resolver knows how to boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows7,
    Windows8,
    Windows10,
    Windows11,
    WindowsGeneric,
    Ubuntu,
    Debian,
    RedHat,
    OpenSuse,
    Arch,
    Unknown,
}

impl OsFamily {
    /// True for every Windows variant, version-specific or generic.
    pub fn is_windows(self) -> bool {
        matches!(
            self,
            OsFamily::Windows7
                | OsFamily::Windows8
                | OsFamily::Windows10
                | OsFamily::Windows11
                | OsFamily::WindowsGeneric
        )
    }

    /// Human-readable family name for menu entry titles.
    pub fn display_name(self) -> &'static str {
        match self {
            OsFamily::Windows7 => "Windows 7",
            OsFamily::Windows8 => "Windows 8",
            OsFamily::Windows10 => "Windows 10",
            OsFamily::Windows11 => "Windows 11",
            OsFamily::WindowsGeneric => "Windows",
            OsFamily::Ubuntu => "Ubuntu",
            OsFamily::Debian => "Debian",
            OsFamily::RedHat => "Red Hat",
            OsFamily::OpenSuse => "openSUSE",
            OsFamily::Arch => "Arch",
            OsFamily::Unknown => "Unknown",
        }
    }
}

/// Ordered classification rules, first match wins.
///
/// Version-specific Windows markers come before the generic "windows" rule;
/// Linux families follow; anything unmatched is Unknown.
const RULES: &[(&[&str], OsFamily)] = &[
    (
        &["win11", "windows11", "windows-11", "windows_11", "windows 11"],
        OsFamily::Windows11,
    ),
    (
        &["win10", "windows10", "windows-10", "windows_10", "windows 10"],
        OsFamily::Windows10,
    ),
    (
        &["win8", "windows8", "windows-8", "windows_8", "windows 8"],
        OsFamily::Windows8,
    ),
    (
        &["win7", "windows7", "windows-7", "windows_7", "windows 7"],
        OsFamily::Windows7,
    ),
    (&["windows", "winpe", "win2go"], OsFamily::WindowsGeneric),
    (
        &["ubuntu", "kubuntu", "xubuntu", "lubuntu"],
        OsFamily::Ubuntu,
    ),
    (&["debian"], OsFamily::Debian),
    (
        &["fedora", "centos", "rhel", "redhat", "red-hat", "rocky", "alma"],
        OsFamily::RedHat,
    ),
    (&["opensuse", "suse"], OsFamily::OpenSuse),
    (&["arch", "manjaro", "endeavour"], OsFamily::Arch),
];

/// Classify a source name into an OS family.
///
/// Case-insensitive substring matching over the ordered rule table. Always
/// returns a value; names matching no rule are Unknown.
pub fn classify(name: &str) -> OsFamily {
    let lower = name.to_lowercase();
    for (patterns, family) in RULES {
        if patterns.iter().any(|p| lower.contains(p)) {
            return *family;
        }
    }
    OsFamily::Unknown
}

//! Kernel/initrd locator for extracted directory trees.
//!
//! All supported families ship the kernel next to its initial ramdisk, so
//! the search finds the first initrd-named file in the tree and then looks
//! for a kernel only in that file's directory. Searching the whole tree
//! for a kernel would pick up unrelated kernel images (e.g. inside a
//! container image elsewhere in the tree).

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Name prefixes identifying an initial ramdisk image.
const INITRD_PATTERNS: &[&str] = &["initrd", "initramfs", "minirt"];

/// Name prefixes identifying a kernel image.
const KERNEL_PATTERNS: &[&str] = &["vmlinu", "bzimage", "linux"];

/// A co-located kernel and initrd found inside an extracted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelPair {
    pub kernel: PathBuf,
    pub initrd: PathBuf,
}

/// True if the file name looks like an initial ramdisk.
pub fn is_initrd_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    INITRD_PATTERNS.iter().any(|p| lower.starts_with(p))
}

/// True if the file name looks like a kernel image.
///
/// Initrd names never qualify, even though "linux*" would otherwise be
/// ambiguous with some ramdisk naming schemes.
pub fn is_kernel_name(name: &str) -> bool {
    if is_initrd_name(name) {
        return false;
    }
    let lower = name.to_lowercase();
    KERNEL_PATTERNS.iter().any(|p| lower.starts_with(p))
}

/// Search an extracted tree for a bootable kernel/initrd pair.
///
/// Walks the tree in sorted order; the first initrd-named file fixes the
/// directory, and only that directory is searched for the kernel. Returns
/// None when either file is missing; the caller downgrades the source,
/// it is not a fatal condition.
pub fn find_kernel_pair(root: &Path) -> Option<KernelPair> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("  [WARN] error walking {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if is_initrd_name(&name) {
            let dir = entry.path().parent()?;
            return find_kernel_in(dir, entry.path());
        }
    }
    None
}

/// Search a single directory (non-recursive) for a kernel image.
fn find_kernel_in(dir: &Path, initrd: &Path) -> Option<KernelPair> {
    let mut entries: Vec<_> = fs::read_dir(dir).ok()?.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path == initrd || !path.is_file() {
            continue;
        }
        if is_kernel_name(&entry.file_name().to_string_lossy()) {
            return Some(KernelPair {
                kernel: path,
                initrd: initrd.to_path_buf(),
            });
        }
    }
    None
}

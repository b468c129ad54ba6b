//! Tests for the per-source resolution pipeline: locator, embedded-config
//! probing, chainload resolution, and the strategy state machine over
//! real directory trees.

mod helpers;

use helpers::{write_file, TestEnv};
use multiso::catalog::{InstallerSource, SourceKind};
use multiso::chainload;
use multiso::embedded::{self, EmbeddedConfig};
use multiso::locate;
use multiso::rewrite::RewriteCtx;
use multiso::strategy::{self, BootStrategy, ChainloadTarget};
use multiso::template::TemplateTable;

fn ctx() -> RewriteCtx {
    RewriteCtx {
        iso_path: "/iso/test.iso".to_string(),
        volume_label: "MULTISO".to_string(),
    }
}

// =============================================================================
// Kernel/initrd locator
// =============================================================================

#[test]
fn test_locator_finds_colocated_pair() {
    let env = TestEnv::new();
    let tree = env.add_tree("live");
    write_file(&tree.join("casper/initrd"), b"rd");
    write_file(&tree.join("casper/vmlinuz"), b"kernel");

    let pair = locate::find_kernel_pair(&tree).expect("pair should be found");
    assert_eq!(pair.kernel, tree.join("casper/vmlinuz"));
    assert_eq!(pair.initrd, tree.join("casper/initrd"));
}

#[test]
fn test_locator_only_searches_first_initrd_directory() {
    let env = TestEnv::new();
    let tree = env.add_tree("live");
    // "a" sorts before "b": the initrd in a/ wins, and a/ has no kernel.
    write_file(&tree.join("a/initrd.img"), b"rd");
    write_file(&tree.join("b/initrd.img"), b"rd");
    write_file(&tree.join("b/vmlinuz"), b"kernel");

    assert!(locate::find_kernel_pair(&tree).is_none());
}

#[test]
fn test_locator_ignores_kernel_without_initrd() {
    let env = TestEnv::new();
    let tree = env.add_tree("live");
    write_file(&tree.join("boot/vmlinuz"), b"kernel");

    assert!(locate::find_kernel_pair(&tree).is_none());
}

// =============================================================================
// Embedded-config probing (against plain trees, no mount involved)
// =============================================================================

#[test]
fn test_inspect_tree_finds_loopback_cfg() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(
        &tree.join("boot/grub/loopback.cfg"),
        b"menuentry \"Try\" {\n\tlinux /casper/vmlinuz iso-scan/filename=${iso_path} quiet\n\tinitrd /casper/initrd\n}\n",
    );

    match embedded::inspect_tree(&tree, &ctx()) {
        EmbeddedConfig::Found {
            linux_line,
            initrd_line,
        } => {
            // The iso-scan token is rewritten for the medium.
            assert_eq!(
                linux_line,
                "linux /casper/vmlinuz iso-scan/filename=/iso/test.iso quiet"
            );
            assert_eq!(initrd_line, "initrd /casper/initrd");
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn test_inspect_tree_decoy_redirect_only() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(
        &tree.join("boot/grub/loopback.cfg"),
        b"source /boot/grub/grub.cfg\n",
    );

    assert!(matches!(
        embedded::inspect_tree(&tree, &ctx()),
        EmbeddedConfig::Decoy { .. }
    ));
}

#[test]
fn test_inspect_tree_falls_back_to_efi_config() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(
        &tree.join("EFI/BOOT/grub.cfg"),
        b"linuxefi /boot/vmlinuz root=live:CDLABEL=Fedora rd.live.image\ninitrdefi /boot/initrd.img\n",
    );

    match embedded::inspect_tree(&tree, &ctx()) {
        EmbeddedConfig::Found { linux_line, .. } => {
            assert!(linux_line.contains("root=live:LABEL=MULTISO"));
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[test]
fn test_inspect_tree_nothing_found() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(&tree.join("README"), b"nothing bootable here");

    assert_eq!(embedded::inspect_tree(&tree, &ctx()), EmbeddedConfig::NotFound);
}

#[test]
fn test_inspect_tree_incomplete_config() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    // Kernel line without an initrd line
    write_file(
        &tree.join("boot/grub/grub.cfg"),
        b"linux /casper/vmlinuz quiet\n",
    );

    assert!(matches!(
        embedded::inspect_tree(&tree, &ctx()),
        EmbeddedConfig::Incomplete { .. }
    ));
}

#[test]
fn test_dual_kernel_layout_is_broken() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(&tree.join("isolinux/linux"), b"k1");
    write_file(&tree.join("boot/x86_64/loader/linux"), b"k2");
    // Even with a perfectly good embedded config, the layout wins.
    write_file(
        &tree.join("boot/grub/grub.cfg"),
        b"linux /boot/x86_64/loader/linux\ninitrd /boot/x86_64/loader/initrd\n",
    );

    assert!(matches!(
        embedded::inspect_tree(&tree, &ctx()),
        EmbeddedConfig::Broken { .. }
    ));
}

#[test]
fn test_monolithic_installer_image_is_broken() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(&tree.join("images/install.img"), b"blob");

    assert!(matches!(
        embedded::inspect_tree(&tree, &ctx()),
        EmbeddedConfig::Broken { .. }
    ));
}

#[test]
fn test_live_root_beside_install_img_is_not_broken() {
    let env = TestEnv::new();
    let tree = env.add_tree("mounted");
    write_file(&tree.join("images/install.img"), b"blob");
    write_file(&tree.join("LiveOS/squashfs.img"), b"live");

    assert_eq!(embedded::inspect_tree(&tree, &ctx()), EmbeddedConfig::NotFound);
}

// =============================================================================
// Windows chainload resolution
// =============================================================================

#[test]
fn test_chainload_standard_path() {
    let env = TestEnv::new();
    let tree = env.add_tree("WindowsToGo");
    write_file(&tree.join("EFI/BOOT/BOOTX64.EFI"), b"loader");

    let target = chainload::resolve_chainload(&tree, "/WindowsToGo").unwrap();
    assert_eq!(
        target.as_deref(),
        Some("/WindowsToGo/EFI/BOOT/BOOTX64.EFI")
    );
}

#[test]
fn test_chainload_relocates_boot_manager() {
    let env = TestEnv::new();
    let tree = env.add_tree("win10-togo");
    write_file(&tree.join("EFI/Microsoft/Boot/bootmgfw.efi"), b"bootmgr");

    let target = chainload::resolve_chainload(&tree, "/win10-togo").unwrap();
    assert_eq!(
        target.as_deref(),
        Some("/win10-togo/EFI/BOOT/BOOTX64.EFI")
    );
    // The loader was copied to the firmware-discoverable location.
    assert!(tree.join("EFI/BOOT/BOOTX64.EFI").is_file());
}

#[test]
fn test_chainload_nothing_found() {
    let env = TestEnv::new();
    let tree = env.add_tree("empty");

    assert!(chainload::resolve_chainload(&tree, "/empty").unwrap().is_none());
}

// =============================================================================
// End-to-end resolution over real trees
// =============================================================================

#[test]
fn test_windows_tree_resolves_to_chainload() {
    let env = TestEnv::new();
    let tree = env.add_tree("WindowsToGo");
    write_file(&tree.join("EFI/BOOT/BOOTX64.EFI"), b"loader");

    let source = InstallerSource {
        name: "WindowsToGo".to_string(),
        kind: SourceKind::ExtractedTree,
        path: tree,
        medium_path: "/WindowsToGo".to_string(),
    };
    let entry = strategy::resolve_source(
        &source,
        &env.config(),
        &TemplateTable::builtin(),
        &env.scratch(),
    );

    assert_eq!(
        entry.strategy,
        BootStrategy::Chainload {
            target: ChainloadTarget::EfiBinary {
                path: "/WindowsToGo/EFI/BOOT/BOOTX64.EFI".to_string()
            }
        }
    );
}

#[test]
fn test_tree_without_kernel_resolves_unbootable() {
    let env = TestEnv::new();
    let tree = env.add_tree("fedora-rawhide");
    write_file(&tree.join("LiveOS/squashfs.img"), b"live");

    let source = InstallerSource {
        name: "fedora-rawhide".to_string(),
        kind: SourceKind::ExtractedTree,
        path: tree,
        medium_path: "/fedora-rawhide".to_string(),
    };
    let entry = strategy::resolve_source(
        &source,
        &env.config(),
        &TemplateTable::builtin(),
        &env.scratch(),
    );

    assert!(matches!(entry.strategy, BootStrategy::Unbootable { .. }));
}

#[test]
fn test_uninspectable_image_falls_back_to_manual_template() {
    let env = TestEnv::new();
    // Not a real filesystem image: inspection cannot mount it, which must
    // degrade to the manual template, never abort.
    let iso = env.add_iso("ubuntu-24.04.iso");

    let source = InstallerSource {
        name: "ubuntu-24.04".to_string(),
        kind: SourceKind::Image,
        path: iso,
        medium_path: "/iso/ubuntu-24.04.iso".to_string(),
    };
    let entry = strategy::resolve_source(
        &source,
        &env.config(),
        &TemplateTable::builtin(),
        &env.scratch(),
    );

    match entry.strategy {
        BootStrategy::ManualLoopback {
            kernel,
            initrd,
            params,
        } => {
            assert_eq!(kernel, "/casper/vmlinuz");
            assert_eq!(initrd, "/casper/initrd");
            assert!(params.contains("iso-scan/filename=/iso/ubuntu-24.04.iso"));
        }
        other => panic!("expected ManualLoopback, got {:?}", other),
    }
}

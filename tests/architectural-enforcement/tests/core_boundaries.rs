//! Integration Test: Core Boundaries
//!
//! **Policy**: `rotor-core` decides what is visible and when it changes. It
//! never renders, so it depends on no UI toolkit, and as a library it
//! reports failures instead of panicking.

use std::fs;

use architectural_enforcement::{scan, workspace_root};

const UI_CRATES: &[&str] = &[
    "ratatui",
    "crossterm",
    "tui",
    "egui",
    "eframe",
    "iced",
    "gtk",
    "gtk4",
    "winit",
    "slint",
    "tauri",
];

#[test]
fn test_core_has_no_ui_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("rotor/core/Cargo.toml"))
        .expect("core manifest readable");

    let mut offending = Vec::new();
    let mut in_deps = false;
    for line in manifest.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_deps = line.contains("dependencies");
            continue;
        }
        if !in_deps || line.starts_with('#') {
            continue;
        }
        let name = line.split(['=', '.', ' ']).next().unwrap_or_default();
        if UI_CRATES.contains(&name) {
            offending.push(name.to_string());
        }
    }

    assert!(
        offending.is_empty(),
        "rotor-core must stay surface-agnostic, found UI crates: {offending:?}"
    );
}

#[test]
fn test_no_panicking_shortcuts_in_core() {
    let violations = scan(&["rotor/core/src"], |code| {
        code.contains(".unwrap()") || code.contains(".expect(") || code.contains("panic!(")
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Panicking shortcuts in rotor-core production code:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} violation(s); return a SpinnerError instead.",
            violations.len()
        );
    }
}

#[test]
fn test_core_does_not_print() {
    let violations = scan(&["rotor/core/src"], |code| {
        code.contains("println!(") || code.contains("eprintln!(")
    });

    assert!(
        violations.is_empty(),
        "rotor-core logs through tracing, found: {violations:#?}"
    );
}

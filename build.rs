//! Build script for ownpool.
//!
//! Prints feature notes for users integrating ownpool into their projects.

use std::env;

fn main() {
    // Re-run if features change
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DEBUG");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PARKING_LOT");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_LOG");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DIAGNOSTICS");

    let debug_enabled = env::var("CARGO_FEATURE_DEBUG").is_ok();
    let parking_lot_enabled = env::var("CARGO_FEATURE_PARKING_LOT").is_ok();
    let log_enabled = env::var("CARGO_FEATURE_LOG").is_ok();
    let diagnostics_enabled = env::var("CARGO_FEATURE_DIAGNOSTICS").is_ok();

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";

    // =========================================================================
    // Feature-specific notes
    // =========================================================================

    if debug_enabled && is_release {
        emit_warning("'debug' feature enabled in release build");
        emit_note("Borrow traces are only captured once debug mode is switched on");
        emit_note("(set_debug_mode(true) or OWNPOOL_DEBUG=1), but the backtrace");
        emit_note("dependency is still linked. Disable the feature for production.");
    }

    if diagnostics_enabled {
        emit_info("Verbose diagnostics enabled");
    }

    if is_release && !parking_lot_enabled {
        emit_note("Tip: Consider enabling 'parking_lot' for better mutex performance:");
        emit_note("  ownpool = { version = \"0.1\", features = [\"parking_lot\"] }");
    }

    if !log_enabled && diagnostics_enabled {
        emit_note("Diagnostics go to stderr only; enable 'log' to route them through the log crate");
    }
}

// =============================================================================
// Diagnostic emission helpers
// =============================================================================

fn emit_info(msg: &str) {
    println!("cargo:warning=[ownpool] {}", msg);
}

fn emit_note(msg: &str) {
    println!("cargo:warning=[ownpool]    {}", msg);
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[ownpool] warning: {}", msg);
}

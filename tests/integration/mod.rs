//! Integration test suite for cdi-capgen
//!
//! End-to-end tests that run the `cdi-capgen` binary on files written to a
//! temporary directory.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **analyze**: the `analyze` command, manifests in and out
//! - **beans**: the `beans` listing
//! - **descriptor**: the `check-descriptor` command
//! - **error_scenarios**: invalid input and failing analyses

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod analyze;
mod beans;
mod descriptor;
mod error_scenarios;

use assert_cmd::Command;

/// The `cdi-capgen` binary with `RUST_LOG` and the instruction override
/// cleared.
pub fn cdi_capgen() -> Command {
    let mut cmd = Command::cargo_bin("cdi-capgen").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("CDI_CAPGEN_INSTRUCTIONS").arg("--no-color");
    cmd
}

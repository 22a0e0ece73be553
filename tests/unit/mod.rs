//! Unit test suite for cdi-capgen
//!
//! Library-level tests that drive a whole analysis run over class models built
//! in code, without going through the CLI.
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! # Test Organization
//!
//! - **synthesis**: capability and requirement headers for whole units
//! - **archives**: bean archive membership from nested JARs and descriptors

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod archives;
mod synthesis;

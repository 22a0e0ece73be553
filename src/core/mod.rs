//! Core types and error handling for cdi-capgen
//!
//! This module holds the building blocks shared by every other module:
//!
//! - [`CapgenError`] and [`ErrorContext`] for hard failures (bad configuration,
//!   unreadable inputs), rendered with suggestions by [`user_friendly_error`]
//! - [`AnalysisContext`] and [`Diagnostic`] for the non-fatal problems found in
//!   analyzed classes, which drop a single contribution but never stop a run
//!
//! # Error Handling Pattern
//!
//! Library functions return [`Result`] with [`CapgenError`]; the CLI layer works
//! with `anyhow::Result` and adds context with `.with_context(...)`. Problems with
//! the *content* being analyzed go to the [`AnalysisContext`] instead.

pub mod analysis_context;
pub mod error;

pub use analysis_context::{AnalysisContext, Diagnostic, Severity};
pub use error::{CapgenError, ErrorContext, Result, user_friendly_error};

//! Analysis-scoped diagnostics collection.
//!
//! Provides a context object that flows through one analysis run, collecting
//! the non-fatal problems found in the analyzed classes without global state.
//!
//! # Overview
//!
//! The [`AnalysisContext`] is created at the start of an analysis and passed
//! by reference to the bean reader, the capability synthesizer and the archive
//! scanner. Every reported problem is recorded as a [`Diagnostic`] and also
//! emitted through `tracing`, so that it shows up in logs as it happens.
//!
//! Diagnostics never abort the analysis: the offending reference, service or
//! bean is dropped and the scan continues.
//!
//! # Example
//!
//! ```rust
//! use cdi_capgen::core::AnalysisContext;
//!
//! let ctx = AnalysisContext::new();
//! ctx.error(Some("com.acme.Greeter"), Some("greet"), "method has @Service and returns void");
//!
//! assert!(ctx.has_errors());
//! assert_eq!(ctx.error_count(), 1);
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;
use tracing::{error, warn};

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A problem found while analyzing one class (or the archive layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Class the problem belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Field or method name, if the problem is member specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.class, &self.member) {
            (Some(class), Some(member)) => {
                write!(f, "In bean {class}, member {member}: {}", self.message)
            }
            (Some(class), None) => write!(f, "In bean {class}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Context for a single analysis run.
///
/// Uses a [`Mutex`] for interior mutability so it can be shared by reference
/// between the components of one run, including from several threads if a
/// caller chooses to analyze classes concurrently.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl AnalysisContext {
    /// Create a new, empty analysis context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error diagnostic.
    pub fn error(&self, class: Option<&str>, member: Option<&str>, message: impl Into<String>) {
        self.report(Severity::Error, class, member, message.into());
    }

    /// Record a warning diagnostic.
    pub fn warning(&self, class: Option<&str>, member: Option<&str>, message: impl Into<String>) {
        self.report(Severity::Warning, class, member, message.into());
    }

    fn report(&self, severity: Severity, class: Option<&str>, member: Option<&str>, message: String) {
        let diagnostic = Diagnostic {
            severity,
            class: class.map(str::to_string),
            member: member.map(str::to_string),
            message,
        };

        match severity {
            Severity::Error => error!(target: "cdi_capgen::diagnostics", "{diagnostic}"),
            Severity::Warning => warn!(target: "cdi_capgen::diagnostics", "{diagnostic}"),
        }

        self.lock().push(diagnostic);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.diagnostics.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Snapshot of all diagnostics reported so far, in reporting order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    /// Number of error diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.lock().iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Whether any error diagnostic was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

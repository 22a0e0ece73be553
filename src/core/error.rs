//! Error handling for cdi-capgen
//!
//! This module provides the error types and user-friendly error reporting for the
//! capability generator. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`CapgenError`] - Enumerated error types for all hard failures
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Problems found *inside* the analyzed classes (unresolvable generics, conflicting
//! service declarations, ...) are not errors in this sense. They are reported as
//! [`Diagnostic`](crate::core::Diagnostic)s through the
//! [`AnalysisContext`](crate::core::AnalysisContext) and never abort an analysis.
//!
//! # Error Conversion
//!
//! Common library errors convert automatically:
//! - [`std::io::Error`] → [`CapgenError::IoError`]
//! - [`serde_json::Error`] → [`CapgenError::JsonError`]
//! - [`toml::de::Error`] → [`CapgenError::TomlError`]
//! - [`semver::Error`] → [`CapgenError::SemverError`]
//! - [`zip::result::ZipError`] → [`CapgenError::ZipError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use cdi_capgen::core::{CapgenError, ErrorContext};
//!
//! let context = ErrorContext::new(CapgenError::InvalidInstruction {
//!     instruction: "com.acme.[".to_string(),
//!     reason: "unclosed character class".to_string(),
//! })
//! .with_suggestion("Escape '[' or close the character class");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for cdi-capgen operations.
///
/// # Error Categories
///
/// ## Configuration
/// - [`DiscoveryMode`] - Unknown bean discovery mode token
/// - [`InvalidInstruction`] - Malformed class-matching instruction
/// - [`ConfigError`] - Invalid configuration value
///
/// ## Input Parsing
/// - [`HeaderParse`] - Malformed OSGi header
/// - [`SignatureParse`] - Malformed JVM type signature
/// - [`ManifestParse`] - Malformed `MANIFEST.MF`
/// - [`ClassIndexParse`] - Class index could not be loaded
/// - [`DescriptorError`] - `beans.xml` could not be interpreted
/// - [`ArchiveError`] - Archive or nested archive could not be opened
///
/// [`DiscoveryMode`]: CapgenError::DiscoveryMode
/// [`InvalidInstruction`]: CapgenError::InvalidInstruction
/// [`ConfigError`]: CapgenError::ConfigError
/// [`HeaderParse`]: CapgenError::HeaderParse
/// [`SignatureParse`]: CapgenError::SignatureParse
/// [`ManifestParse`]: CapgenError::ManifestParse
/// [`ClassIndexParse`]: CapgenError::ClassIndexParse
/// [`DescriptorError`]: CapgenError::DescriptorError
/// [`ArchiveError`]: CapgenError::ArchiveError
#[derive(Error, Debug)]
pub enum CapgenError {
    /// A discovery mode token is not one of `all`, `annotated`,
    /// `annotated_by_bean`, `none`.
    #[error("Unrecognized discover '{token}', expected values are [all, annotated, annotated_by_bean, none]")]
    DiscoveryMode {
        /// The offending token, without any `!` prefix
        token: String,
        /// Closest known mode, when one is similar enough
        suggestion: Option<String>,
    },

    /// A class-matching instruction could not be compiled.
    #[error("Invalid instruction '{instruction}': {reason}")]
    InvalidInstruction {
        /// The instruction as written
        instruction: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration value is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// An OSGi header value could not be parsed.
    #[error("Invalid header '{header}': {reason}")]
    HeaderParse {
        /// The header text (or its name)
        header: String,
        /// Why parsing failed
        reason: String,
    },

    /// A JVM descriptor or generic signature could not be parsed.
    #[error("Invalid signature '{signature}' at offset {offset}: {reason}")]
    SignatureParse {
        /// The signature text
        signature: String,
        /// Byte offset where parsing stopped
        offset: usize,
        /// Why parsing failed
        reason: String,
    },

    /// A `MANIFEST.MF` file is malformed.
    #[error("Invalid manifest at line {line}: {reason}")]
    ManifestParse {
        /// One-based line number
        line: usize,
        /// Why parsing failed
        reason: String,
    },

    /// The class index could not be loaded.
    #[error("Invalid class index {file}: {reason}")]
    ClassIndexParse {
        /// Path of the index file
        file: String,
        /// Why loading failed
        reason: String,
    },

    /// A bean descriptor could not be interpreted.
    #[error("Invalid bean descriptor in {archive}: {reason}")]
    DescriptorError {
        /// Archive the descriptor belongs to
        archive: String,
        /// Why interpretation failed
        reason: String,
    },

    /// An archive could not be opened or read.
    #[error("Cannot read archive '{path}': {reason}")]
    ArchiveError {
        /// Path of the archive (or nested entry)
        path: String,
        /// Why reading failed
        reason: String,
    },

    /// The analysis finished but reported errors.
    #[error("Analysis reported {errors} error(s)")]
    AnalysisFailed {
        /// Number of error diagnostics
        errors: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Semver parsing error
    #[error("Semver parsing error: {0}")]
    SemverError(#[from] semver::Error),

    /// Zip error
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// Convenience alias for results carrying a [`CapgenError`].
pub type Result<T, E = CapgenError> = std::result::Result<T, E>;

/// Error context wrapper that provides user-friendly error information.
///
/// `ErrorContext` wraps a [`CapgenError`] and adds optional details and a
/// suggestion, displayed in color on the terminal.
///
/// # Examples
///
/// ```rust,no_run
/// use cdi_capgen::core::{CapgenError, ErrorContext};
///
/// let context = ErrorContext::new(CapgenError::ConfigError {
///     message: "extender_version is empty".to_string(),
/// })
/// .with_details("The extender version pins the osgi.cdi requirement range")
/// .with_suggestion("Set extender_version = \"1.0.0\" in cdi-capgen.toml");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CapgenError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: CapgenError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    ///
    /// - **Error** in red bold
    /// - **Details** in yellow
    /// - **Suggestion** in green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known error types are mapped to contexts with targeted suggestions; anything
/// else becomes [`CapgenError::Other`] carrying the full error chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(capgen_error) = error.downcast_ref::<CapgenError>() {
        let context = create_error_context(capgen_error);
        // Keep what the caller was doing when the library error surfaced.
        let outer = error.to_string();
        if outer == capgen_error.to_string() {
            return context;
        }
        let details = match &context.details {
            Some(details) => format!("{outer}\n{details}"),
            None => outer,
        };
        return context.with_details(details);
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(CapgenError::Other {
                message: error_chain(&error),
            })
            .with_suggestion("Check that the file exists and the path is correct");
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(CapgenError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your cdi-capgen.toml file");
    }

    if let Some(json_error) = error.downcast_ref::<serde_json::Error>() {
        return ErrorContext::new(CapgenError::ClassIndexParse {
            file: "class index".to_string(),
            reason: json_error.to_string(),
        })
        .with_suggestion("The class index must be a JSON object with a \"classes\" array");
    }

    ErrorContext::new(CapgenError::Other {
        message: error_chain(&error),
    })
}

fn error_chain(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn create_error_context(error: &CapgenError) -> ErrorContext {
    let message = error.to_string();
    match error {
        CapgenError::DiscoveryMode {
            token,
            suggestion,
        } => {
            let context = ErrorContext::new(CapgenError::DiscoveryMode {
                token: token.clone(),
                suggestion: suggestion.clone(),
            });
            match suggestion {
                Some(mode) => context.with_suggestion(format!("Did you mean '{mode}'?")),
                None => context.with_suggestion(
                    "Use one of all, annotated, annotated_by_bean or none, optionally prefixed with '!'",
                ),
            }
        }
        CapgenError::InvalidInstruction {
            ..
        } => ErrorContext::new(CapgenError::Other {
            message,
        })
        .with_suggestion("Instructions are comma separated class name globs, e.g. 'com.acme.*;discover=all'"),
        CapgenError::HeaderParse {
            ..
        } => ErrorContext::new(CapgenError::Other {
            message,
        })
        .with_details("Headers use the OSGi syntax: clause (',' clause)*, clause = name (';' key[:type]=value | ';' key:=value)*"),
        CapgenError::ClassIndexParse {
            ..
        } => ErrorContext::new(CapgenError::Other {
            message,
        })
        .with_suggestion("Regenerate the class index; it must be a JSON object with a \"classes\" array"),
        CapgenError::AnalysisFailed {
            errors,
        } => ErrorContext::new(CapgenError::AnalysisFailed {
            errors: *errors,
        })
        .with_suggestion("Fix the reported classes or set fail_on_error = false in cdi-capgen.toml"),
        _ => ErrorContext::new(CapgenError::Other {
            message,
        }),
    }
}

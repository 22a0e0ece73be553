//! Analysis configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. the TOML file (`cdi-capgen.toml` in the working directory, or `--config`)
//! 2. the `CDI_CAPGEN_INSTRUCTIONS` environment variable
//! 3. command-line flags
//!
//! ```toml
//! # cdi-capgen.toml
//! instructions = "com.acme.*;discover=all,!com.acme.internal.*"
//! extender_version = "1.0.0"
//! archive_version = "1.1.0"
//! fail_on_error = true
//! ```
//!
//! Every key is optional.

use crate::archive::descriptor::parse_osgi_version;
use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_ARCHIVE_VERSION, DEFAULT_EXTENDER_VERSION, INSTRUCTIONS_ENV,
};
use crate::core::{CapgenError, Result};
use crate::instruction::Instructions;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

fn default_instructions() -> String {
    "*".to_string()
}

fn default_extender_version() -> String {
    DEFAULT_EXTENDER_VERSION.to_string()
}

fn default_archive_version() -> String {
    DEFAULT_ARCHIVE_VERSION.to_string()
}

const fn default_fail_on_error() -> bool {
    true
}

/// Settings of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapgenConfig {
    /// Instruction header selecting the analyzed classes.
    #[serde(default = "default_instructions")]
    pub instructions: String,

    /// CDI extender version the generated requirement asks for.
    #[serde(default = "default_extender_version")]
    pub extender_version: String,

    /// Descriptor version from which `bean-discovery-mode` is honoured.
    #[serde(default = "default_archive_version")]
    pub archive_version: String,

    /// Exit unsuccessfully when the analysis reported errors.
    #[serde(default = "default_fail_on_error")]
    pub fail_on_error: bool,
}

impl Default for CapgenConfig {
    fn default() -> Self {
        Self {
            instructions: default_instructions(),
            extender_version: default_extender_version(),
            archive_version: default_archive_version(),
            fail_on_error: default_fail_on_error(),
        }
    }
}

impl CapgenConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the configuration file.
    ///
    /// An explicit `path` must exist. Without one, `cdi-capgen.toml` in the
    /// working directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::find() {
                Some(path) => path,
                None => {
                    debug!("No {CONFIG_FILE_NAME} found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| CapgenError::ConfigError {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let config = Self::from_toml(&content).map_err(|e| CapgenError::ConfigError {
            message: format!("{}: {e}", path.display()),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `cdi-capgen.toml` in the working directory, if it exists.
    #[must_use]
    pub fn find() -> Option<PathBuf> {
        let candidate = PathBuf::from(CONFIG_FILE_NAME);
        candidate.is_file().then_some(candidate)
    }

    /// Apply the `CDI_CAPGEN_INSTRUCTIONS` environment variable.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_instructions_override(std::env::var(INSTRUCTIONS_ENV).ok())
    }

    /// Replace the instructions when `instructions` is set and not blank.
    #[must_use]
    pub fn with_instructions_override(mut self, instructions: Option<String>) -> Self {
        if let Some(instructions) = instructions.filter(|value| !value.trim().is_empty()) {
            self.instructions = instructions;
        }
        self
    }

    pub fn instructions(&self) -> Result<Instructions> {
        Instructions::parse(&self.instructions)
    }

    pub fn extender_version(&self) -> Result<Version> {
        Ok(Version::parse(&self.extender_version)?)
    }

    /// Threshold version; OSGi short forms such as `1.1` are accepted.
    pub fn archive_version(&self) -> Result<Version> {
        parse_osgi_version(&self.archive_version)
    }

    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        self.instructions()?;
        self.extender_version().map_err(|e| CapgenError::ConfigError {
            message: format!("invalid extender_version '{}': {e}", self.extender_version),
        })?;
        self.archive_version().map_err(|e| CapgenError::ConfigError {
            message: format!("invalid archive_version '{}': {e}", self.archive_version),
        })?;
        Ok(())
    }
}

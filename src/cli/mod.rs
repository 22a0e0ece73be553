//! Command-line interface for cdi-capgen.
//!
//! # Available Commands
//!
//! - `analyze` - Derive `Provide-Capability`/`Require-Capability` for a unit
//! - `beans` - List the beans of a class index with their services and references
//! - `check-descriptor` - Print the discovery mode declared by a `beans.xml`
//!
//! # Example
//!
//! ```bash
//! # Update a manifest in place from a class index
//! cdi-capgen analyze --index classes.json --manifest META-INF/MANIFEST.MF --output META-INF/MANIFEST.MF
//!
//! # Analyze a bundle, honouring the descriptors of its nested archives
//! cdi-capgen analyze --index classes.json --jar target/app.jar --format json
//!
//! # Which classes are beans when everything is discoverable?
//! cdi-capgen beans --index classes.json --discover all
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Only log errors
//! - `--log-level` - Explicit log filter, e.g. `cdi_capgen::reader=trace`
//! - `--no-color` - Disable colored output
//!
//! `RUST_LOG` is honoured when none of the logging flags is given.

mod analyze;
mod beans;
mod descriptor;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use analyze::AnalyzeCommand;
pub use beans::BeansCommand;
pub use descriptor::DescriptorCommand;

/// Output format of the reporting commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// The full analysis report as JSON.
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "cdi-capgen",
    about = "Derive OSGi service capabilities and requirements from CDI bean annotations",
    version,
    long_about = "cdi-capgen reads the class model of a packaging unit, finds its CDI beans and \
                  writes the osgi.service capabilities and requirements they imply, plus the \
                  osgi.cdi extender requirement, into the unit's manifest headers."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (equivalent to `RUST_LOG=debug`).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log filter directive, overriding `--verbose`, `--quiet` and `RUST_LOG`.
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a class index and update manifest headers.
    Analyze(AnalyzeCommand),

    /// List the beans of a class index.
    Beans(BeansCommand),

    /// Print the discovery mode of a bean descriptor.
    CheckDescriptor(DescriptorCommand),
}

impl Cli {
    /// Run the selected command.
    pub fn execute(self) -> Result<()> {
        if self.no_color {
            colored::control::set_override(false);
        }
        self.init_logging();

        match self.command {
            Commands::Analyze(cmd) => cmd.execute(),
            Commands::Beans(cmd) => cmd.execute(),
            Commands::CheckDescriptor(cmd) => cmd.execute(),
        }
    }

    /// Log filter derived from the global flags; `None` defers to `RUST_LOG`.
    #[must_use]
    pub fn log_filter(&self) -> Option<String> {
        if let Some(level) = &self.log_level {
            Some(level.clone())
        } else if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        }
    }

    fn init_logging(&self) {
        let filter = match self.log_filter() {
            Some(directive) => EnvFilter::new(directive),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        // Logs go to stderr so stdout stays usable for manifests and JSON.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(!self.no_color)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_precedence() {
        let cli = Cli::parse_from(["cdi-capgen", "--verbose", "check-descriptor", "beans.xml"]);
        assert_eq!(cli.log_filter().as_deref(), Some("debug"));

        let cli = Cli::parse_from(["cdi-capgen", "--quiet", "check-descriptor", "beans.xml"]);
        assert_eq!(cli.log_filter().as_deref(), Some("error"));

        let cli = Cli::parse_from([
            "cdi-capgen",
            "--verbose",
            "--log-level",
            "trace",
            "check-descriptor",
            "beans.xml",
        ]);
        assert_eq!(cli.log_filter().as_deref(), Some("trace"));

        let cli = Cli::parse_from(["cdi-capgen", "check-descriptor", "beans.xml"]);
        assert_eq!(cli.log_filter(), None);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result =
            Cli::try_parse_from(["cdi-capgen", "--verbose", "--quiet", "check-descriptor", "b.xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_arguments() {
        let cli = Cli::parse_from([
            "cdi-capgen",
            "analyze",
            "--index",
            "classes.json",
            "--format",
            "json",
            "--instructions",
            "com.acme.*",
        ]);
        match cli.command {
            Commands::Analyze(cmd) => {
                assert_eq!(cmd.format, OutputFormat::Json);
                assert_eq!(cmd.instructions.as_deref(), Some("com.acme.*"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

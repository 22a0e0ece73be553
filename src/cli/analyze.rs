//! The `analyze` command.
//!
//! Loads a class index (plus, optionally, the unit JAR and an existing
//! manifest), runs the [`CapabilitySynthesizer`] and emits the updated
//! manifest or the full [`AnalysisReport`].
//!
//! ```bash
//! cdi-capgen analyze --index classes.json --manifest MANIFEST.MF --output MANIFEST.MF
//! ```

use super::OutputFormat;
use crate::archive::{Archive, BeanArchives, JarArchive};
use crate::class::ClassIndex;
use crate::config::CapgenConfig;
use crate::core::{AnalysisContext, CapgenError, Severity};
use crate::manifest::Manifest;
use crate::synthesizer::{AnalysisReport, CapabilitySynthesizer};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the unit when neither the index nor an archive names it.
const DEFAULT_UNIT_NAME: &str = "unit";

#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    /// JSON class index of the unit.
    #[arg(long, value_name = "FILE")]
    pub index: PathBuf,

    /// Unit JAR; its nested archives and `beans.xml` descriptors decide which
    /// packages are analyzed.
    #[arg(long, value_name = "FILE")]
    pub jar: Option<PathBuf>,

    /// Manifest whose headers are merged; defaults to the JAR's manifest.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Instruction header, overriding the configuration and environment.
    #[arg(long)]
    pub instructions: Option<String>,

    /// Configuration file (default: `cdi-capgen.toml` if present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the updated manifest to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Succeed even when the analysis reported errors.
    #[arg(long)]
    pub allow_errors: bool,
}

impl AnalyzeCommand {
    pub fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref(), self.instructions.clone())?;
        let ctx = AnalysisContext::new();

        let unit = Unit::load(&self.index, self.jar.as_deref(), &config, &ctx)?;
        let mut manifest = match (&self.manifest, &unit.jar) {
            (Some(path), _) => Manifest::load(path)
                .with_context(|| format!("Failed to read manifest {}", path.display()))?,
            (None, Some(jar)) => jar.manifest()?.unwrap_or_default(),
            (None, None) => Manifest::new(),
        };

        let report = unit.analyze(&config, &mut manifest, &ctx)?;

        if let Some(output) = &self.output {
            manifest
                .save(output)
                .with_context(|| format!("Failed to write manifest {}", output.display()))?;
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => {
                match &self.output {
                    Some(output) => println!(
                        "{} {} bean(s), {} capability and {} requirement clause(s) written to {}",
                        "✓".green(),
                        report.beans.len(),
                        report.provided.len(),
                        report.required.len(),
                        output.display()
                    ),
                    None => print!("{manifest}"),
                }
                print_diagnostics(&report);
            }
        }

        let errors = report.error_count();
        if errors > 0 && config.fail_on_error && !self.allow_errors {
            return Err(CapgenError::AnalysisFailed {
                errors,
            }
            .into());
        }
        Ok(())
    }
}

/// Configuration with environment and command-line overrides applied.
pub(super) fn load_config(path: Option<&Path>, instructions: Option<String>) -> Result<CapgenConfig> {
    let config = CapgenConfig::load(path)?.with_env().with_instructions_override(instructions);
    config.validate()?;
    debug!("Instructions: {}", config.instructions);
    Ok(config)
}

/// A class index together with the archives it was read from.
pub(super) struct Unit {
    pub index: ClassIndex,
    pub archives: BeanArchives,
    pub jar: Option<JarArchive>,
}

impl Unit {
    pub fn load(
        index: &Path,
        jar: Option<&Path>,
        config: &CapgenConfig,
        ctx: &AnalysisContext,
    ) -> Result<Self> {
        let index = ClassIndex::load(index)
            .with_context(|| format!("Failed to load class index {}", index.display()))?;

        let (archives, jar) = match jar {
            Some(path) => {
                let jar = JarArchive::open(path)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                let archives = BeanArchives::discover(&jar, &config.archive_version()?, ctx)?;
                (archives, Some(jar))
            }
            None => (
                BeanArchives::unit(index.name().unwrap_or(DEFAULT_UNIT_NAME), index.version()),
                None,
            ),
        };
        debug!("Bean archives: {:?}", archives.names());

        Ok(Self {
            index,
            archives,
            jar,
        })
    }

    pub fn analyze(
        &self,
        config: &CapgenConfig,
        manifest: &mut Manifest,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisReport> {
        let instructions = config.instructions()?;
        let sources = self.index.package_sources();
        let synthesizer =
            CapabilitySynthesizer::new(&self.index, &instructions, &sources, &self.archives)
                .with_extender_version(config.extender_version()?);
        Ok(synthesizer.analyze(manifest, ctx))
    }
}

pub(super) fn print_diagnostics(report: &AnalysisReport) {
    for diagnostic in &report.diagnostics {
        let label = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        eprintln!("{label}: {diagnostic}");
    }
}

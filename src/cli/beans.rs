//! The `beans` command: which classes are beans, and what they publish and
//! consume.

use super::OutputFormat;
use super::analyze::{Unit, load_config, print_diagnostics};
use crate::core::AnalysisContext;
use crate::manifest::Manifest;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BeansCommand {
    /// JSON class index of the unit.
    #[arg(long, value_name = "FILE")]
    pub index: PathBuf,

    /// Discovery expression applied to every class (e.g. `all`), replacing
    /// the configured instructions.
    #[arg(long, value_name = "EXPR", conflicts_with = "instructions")]
    pub discover: Option<String>,

    /// Instruction header, overriding the configuration and environment.
    #[arg(long)]
    pub instructions: Option<String>,

    /// Configuration file (default: `cdi-capgen.toml` if present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl BeansCommand {
    pub fn execute(self) -> Result<()> {
        let instructions = match &self.discover {
            Some(expression) => Some(format!("*;discover=\"{expression}\"")),
            None => self.instructions.clone(),
        };
        let config = load_config(self.config.as_deref(), instructions)?;
        let ctx = AnalysisContext::new();

        let unit = Unit::load(&self.index, None, &config, &ctx)?;
        let mut scratch = Manifest::new();
        let report = unit.analyze(&config, &mut scratch, &ctx)?;

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&report.beans)?);
            return Ok(());
        }

        if report.beans.is_empty() {
            println!("No beans found");
        }
        for bean in &report.beans {
            println!("{} {}", bean.class.bold(), bean.modes.to_string().dimmed());
            let Some((identity, producers)) = bean.definitions.split_first() else {
                continue;
            };
            if !identity.service.is_empty() {
                println!("  provides: {}", identity.service.join(", "));
            }
            for reference in &identity.references {
                println!("  requires: {} ({})", reference.service, reference.cardinality);
            }
            for producer in producers {
                println!("  produces: {}", producer.service.join(", "));
            }
        }
        print_diagnostics(&report);
        Ok(())
    }
}

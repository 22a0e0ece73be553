//! The `check-descriptor` command.

use crate::archive::{find_discovery_mode, parse_osgi_version};
use crate::constants::DEFAULT_ARCHIVE_VERSION;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct DescriptorCommand {
    /// Path to a `beans.xml`; a missing file means discovery mode `none`.
    pub descriptor: PathBuf,

    /// First descriptor version whose `bean-discovery-mode` is honoured.
    #[arg(long, default_value = DEFAULT_ARCHIVE_VERSION)]
    pub archive_version: String,
}

impl DescriptorCommand {
    pub fn execute(self) -> Result<()> {
        let threshold = parse_osgi_version(&self.archive_version)
            .with_context(|| format!("Invalid --archive-version '{}'", self.archive_version))?;

        let content = if self.descriptor.is_file() {
            Some(std::fs::read(&self.descriptor).with_context(|| {
                format!("Failed to read {}", self.descriptor.display())
            })?)
        } else {
            None
        };

        let mode = find_discovery_mode(content.as_deref(), &threshold)
            .with_context(|| format!("Invalid descriptor {}", self.descriptor.display()))?;
        println!("{mode}");
        Ok(())
    }
}

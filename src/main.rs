//! cdi-capgen CLI entry point
//!
//! Parses the command line, runs the selected command and renders failures
//! as user-friendly errors with suggestions.

use anyhow::Result;
use cdi_capgen::cli;
use cdi_capgen::core::user_friendly_error;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}

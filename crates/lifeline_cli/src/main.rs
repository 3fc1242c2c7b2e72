//! Lifeline command-line front end.
//!
//! # Responsibility
//! - Drive `lifeline_core` from a shell: bulk import, export, inspection and storage.
//! - Own process setup (settings file, file logging).

mod assets;
mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}

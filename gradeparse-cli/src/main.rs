//! CLI entry point for the grade-distribution spreadsheet parser.
//!
//! Ingests per-section grade workbooks, normalizes and reshapes them, checks
//! grade-count consistency per section, and writes combined outputs plus an
//! archive for download.

mod cli;
mod grades;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parse {
            files,
            header_row,
            sheets,
            out_dir,
            json,
        } => cli::commands::parse::handle_parse_command(files, header_row, sheets, &out_dir, json),
    }
}

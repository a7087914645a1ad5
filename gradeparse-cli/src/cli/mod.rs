//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gradeparse-cli")]
#[command(about = "Parse per-section grade-distribution spreadsheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse grade workbooks and write combined wide/long/validation outputs
    Parse {
        /// Input workbooks (.xlsx or .xlsm)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Header row override (0-based); detected per sheet when omitted
        #[arg(long)]
        header_row: Option<usize>,

        /// Sheets to parse, as names or 0-based indices (comma-separated);
        /// all sheets when omitted
        #[arg(long, value_delimiter = ',')]
        sheets: Option<Vec<String>>,

        /// Directory that per-run output directories are created under
        #[arg(short, long, default_value = "runs")]
        out_dir: PathBuf,

        /// Print the run report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

//! Grade-distribution spreadsheet pipeline
//!
//! This module turns uploaded grade workbooks into a combined wide table, a
//! long/tidy table, and a per-section validation summary, and packages the
//! persisted artifacts for download.

pub mod columns;
pub mod excel;
pub mod header;
pub mod output;
pub mod reshape;
pub mod run;
pub mod types;
pub mod validate;

pub use run::{RunOptions, RunResult, RunSummary, new_run_id, process_files};
pub use types::{Cell, Table};

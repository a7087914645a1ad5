//! Parse command handler

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::grades::types::Table;
use crate::grades::{RunOptions, RunResult, RunSummary, new_run_id, process_files};

/// Accepted workbook extensions (legacy .xls must be converted first)
const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    summary: &'a RunSummary,
    outputs: Vec<String>,
}

/// Handle the parse command: vet inputs, run the pipeline, report results
pub fn handle_parse_command(
    files: Vec<PathBuf>,
    header_row: Option<usize>,
    sheets: Option<Vec<String>>,
    out_dir: &Path,
    json: bool,
) -> Result<()> {
    let mut inputs = Vec::new();
    for file in files {
        if !is_allowed_extension(&file) {
            log::warn!(
                "Skipping unsupported file type: {} (expected one of: {})",
                file.display(),
                ALLOWED_EXTENSIONS.map(|e| format!(".{}", e)).join(", ")
            );
            continue;
        }
        if !file.exists() {
            anyhow::bail!("Input file does not exist: {}", file.display());
        }
        inputs.push(file);
    }
    if inputs.is_empty() {
        anyhow::bail!("No valid .xlsx/.xlsm input files given");
    }

    let run_id = new_run_id();
    let run_dir = out_dir.join(&run_id);
    let options = RunOptions { header_row, sheets };

    log::info!("Starting run {} with {} file(s)", run_id, inputs.len());
    let result = process_files(&inputs, &options, &run_dir)
        .with_context(|| format!("Run {} failed", run_id))?;

    if json {
        print_json_report(&run_id, &result)?;
    } else {
        print_text_report(&run_id, &result);
    }
    Ok(())
}

fn is_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn print_json_report(run_id: &str, result: &RunResult) -> Result<()> {
    let outputs = [
        &result.outputs.wide_csv,
        &result.outputs.long_csv,
        &result.outputs.xlsx,
        &result.outputs.archive,
    ]
    .map(|p| p.display().to_string())
    .to_vec();

    let report = JsonReport {
        run_id,
        summary: &result.summary,
        outputs,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_text_report(run_id: &str, result: &RunResult) {
    println!("Run {}", run_id);
    println!();

    println!("Parsed files and sheets:");
    print_table(&result.sheet_counts);
    println!();

    println!("Rows:            {}", result.summary.wide_rows);
    println!("Sections:        {}", result.summary.sections);
    println!("Failed sections: {}", result.summary.failed_sections);
    println!();

    println!("Outputs:");
    for path in [
        &result.outputs.wide_csv,
        &result.outputs.long_csv,
        &result.outputs.xlsx,
        &result.outputs.archive,
    ] {
        println!("  {}", path.display());
    }
}

fn print_table(table: &Table) {
    println!("  {}", table.columns.join("  "));
    for row in &table.rows {
        let fields: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        println!("  {}", fields.join("  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_extension(Path::new("grades.xlsx")));
        assert!(is_allowed_extension(Path::new("grades.XLSM")));
        assert!(!is_allowed_extension(Path::new("grades.xls")));
        assert!(!is_allowed_extension(Path::new("grades.csv")));
        assert!(!is_allowed_extension(Path::new("grades")));
    }
}

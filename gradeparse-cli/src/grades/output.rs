//! Delimited output and archive bundling for run artifacts

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::{ExtendedFileOptions, FileOptions};

use super::types::Table;

/// Write a table as CSV: one header record, one record per row.
///
/// Null cells and NaN ratios render as empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    wtr.write_record(&table.columns)
        .context("Failed to write CSV header")?;

    for row in &table.rows {
        let record: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        wtr.write_record(&record)
            .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
    }

    wtr.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

/// Bundle already-written artifact files into one deflate-compressed zip.
///
/// Entries are named by each file's final path component.
pub fn write_archive<P: AsRef<Path>>(archive_path: &Path, files: &[P]) -> Result<()> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create archive: {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options =
        FileOptions::<ExtendedFileOptions>::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let path = path.as_ref();
        let name = path
            .file_name()
            .with_context(|| format!("Archive entry has no file name: {}", path.display()))?
            .to_string_lossy();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read artifact: {}", path.display()))?;
        zip.start_file(name.as_ref(), options.clone())?;
        zip.write_all(&bytes)?;
    }

    zip.finish().context("Failed to finalize archive")?;
    Ok(())
}

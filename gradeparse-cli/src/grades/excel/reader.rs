//! Read grade workbooks into normalized wide tables
//!
//! One workbook load resolves the requested sheets, reads each as an untyped
//! grid, finds the header row, normalizes and coerces columns, tags rows
//! with provenance, and concatenates the per-sheet tables.

use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, Xlsx, open_workbook};

use crate::grades::columns::{REQUIRED_HEADER_LABELS, coerce_types, normalize_columns};
use crate::grades::header::detect_header_row;
use crate::grades::types::{Cell, Table};

/// A requested sheet name or index does not exist in a workbook
#[derive(Debug, Clone)]
pub struct InvalidSheetSelectorError {
    pub selector: String,
    pub file: String,
    pub available: Vec<String>,
}

impl std::fmt::Display for InvalidSheetSelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sheet selector '{}' not valid for {}. Available sheets: {}",
            self.selector,
            self.file,
            self.available.join(", ")
        )
    }
}

impl std::error::Error for InvalidSheetSelectorError {}

/// Resolve a sheet-selection list against a workbook's sheet names.
///
/// No selection means every sheet in file order. A selector consisting only
/// of digits is a zero-based index; anything else must match a sheet name
/// exactly. Blank selectors are skipped. Any unresolved selector fails the
/// whole workbook.
pub fn resolve_sheet_selection(
    sheet_names: &[String],
    selection: Option<&[String]>,
    file: &str,
) -> Result<Vec<String>, InvalidSheetSelectorError> {
    let Some(selection) = selection else {
        return Ok(sheet_names.to_vec());
    };

    let mut resolved = Vec::new();
    for raw in selection {
        let selector = raw.trim();
        if selector.is_empty() {
            continue;
        }

        if selector.chars().all(|c| c.is_ascii_digit()) {
            let idx: usize = selector.parse().map_err(|_| InvalidSheetSelectorError {
                selector: selector.to_string(),
                file: file.to_string(),
                available: sheet_names.to_vec(),
            })?;
            match sheet_names.get(idx) {
                Some(name) => resolved.push(name.clone()),
                None => {
                    return Err(InvalidSheetSelectorError {
                        selector: selector.to_string(),
                        file: file.to_string(),
                        available: sheet_names.to_vec(),
                    });
                }
            }
        } else if sheet_names.iter().any(|n| n == selector) {
            resolved.push(selector.to_string());
        } else {
            return Err(InvalidSheetSelectorError {
                selector: selector.to_string(),
                file: file.to_string(),
                available: sheet_names.to_vec(),
            });
        }
    }

    Ok(resolved)
}

/// Convert an Excel cell to a table cell
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Null,
        Data::String(s) if s.trim().is_empty() => Cell::Null,
        Data::String(s) => Cell::String(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::String(format!("{}", dt)),
        Data::DateTimeIso(s) => Cell::String(s.clone()),
        Data::DurationIso(s) => Cell::String(s.clone()),
        Data::Error(_) => Cell::Null,
    }
}

/// Load one sheet into a normalized, typed, provenance-tagged table
fn load_sheet<R: Read + Seek>(
    workbook: &mut Xlsx<R>,
    sheet_name: &str,
    header_row: Option<usize>,
    file_name: &str,
) -> Result<Table> {
    let range = workbook
        .worksheet_range(sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let grid: Vec<Vec<Cell>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    let header_idx = match header_row {
        Some(idx) => idx,
        None => detect_header_row(&grid, &REQUIRED_HEADER_LABELS, file_name, sheet_name)?,
    };
    if header_idx >= grid.len() {
        bail!(
            "Header row {} is past the end of sheet '{}' in {} ({} rows)",
            header_idx,
            sheet_name,
            file_name,
            grid.len()
        );
    }

    let labels: Vec<String> = grid[header_idx].iter().map(|c| c.to_string()).collect();
    let mut table = Table::new(labels);
    for row in &grid[header_idx + 1..] {
        // Fully empty rows carry no section data
        if row.iter().all(|c| c.is_null()) {
            continue;
        }
        table.push_row(row.clone());
    }

    normalize_columns(&mut table);
    for warning in coerce_types(&mut table) {
        log::debug!("{} / '{}': {}", file_name, sheet_name, warning);
    }

    table.add_const_column("Sheet", Cell::String(sheet_name.to_string()));
    table.add_const_column("SourceFile", Cell::String(file_name.to_string()));

    log::debug!(
        "Loaded {} rows from {} / '{}' (header row {})",
        table.row_count(),
        file_name,
        sheet_name,
        header_idx
    );
    Ok(table)
}

/// Load all selected sheets of one workbook and concatenate them.
///
/// `header_row` overrides header detection for every sheet when given.
pub fn load_workbook(
    path: &Path,
    header_row: Option<usize>,
    selection: Option<&[String]>,
) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let sheet_names = workbook.sheet_names().to_vec();
    let selected = resolve_sheet_selection(&sheet_names, selection, &file_name)?;

    let mut tables = Vec::new();
    for sheet in &selected {
        tables.push(load_sheet(&mut workbook, sheet, header_row, &file_name)?);
    }
    Ok(Table::concat(tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_selection_uses_all_sheets() {
        let sheets = names(&["Fall2024", "Spring2025"]);
        let resolved = resolve_sheet_selection(&sheets, None, "f.xlsx").unwrap();
        assert_eq!(resolved, sheets);
    }

    #[test]
    fn test_mixed_index_and_name_selectors() {
        let sheets = names(&["Fall2024", "Spring2025"]);
        let selection = names(&["0", "Spring2025"]);
        let resolved = resolve_sheet_selection(&sheets, Some(&selection), "f.xlsx").unwrap();
        assert_eq!(resolved, names(&["Fall2024", "Spring2025"]));
    }

    #[test]
    fn test_blank_selectors_are_skipped() {
        let sheets = names(&["Fall2024", "Spring2025"]);
        let selection = names(&[" ", "1", ""]);
        let resolved = resolve_sheet_selection(&sheets, Some(&selection), "f.xlsx").unwrap();
        assert_eq!(resolved, names(&["Spring2025"]));
    }

    #[test]
    fn test_unknown_name_names_available_sheets() {
        let sheets = names(&["Fall2024", "Spring2025"]);
        let selection = names(&["Winter2025"]);
        let err = resolve_sheet_selection(&sheets, Some(&selection), "f.xlsx").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Winter2025"));
        assert!(message.contains("Fall2024"));
        assert!(message.contains("Spring2025"));
    }

    #[test]
    fn test_index_out_of_range_fails() {
        let sheets = names(&["Fall2024"]);
        let selection = names(&["1"]);
        let err = resolve_sheet_selection(&sheets, Some(&selection), "f.xlsx").unwrap_err();
        assert_eq!(err.selector, "1");
    }

    #[test]
    fn test_cell_from_data() {
        assert_eq!(cell_from_data(&Data::Empty), Cell::Null);
        assert_eq!(cell_from_data(&Data::String("  ".into())), Cell::Null);
        assert_eq!(cell_from_data(&Data::Int(5)), Cell::Int(5));
        assert_eq!(cell_from_data(&Data::Float(2.5)), Cell::Float(2.5));
        assert_eq!(cell_from_data(&Data::Bool(true)), Cell::Bool(true));
    }
}

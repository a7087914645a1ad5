//! Write the combined wide table to a cleaned workbook

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::grades::types::{Cell, Table};

/// Sheet name for the combined wide data
const WIDE_SHEET_NAME: &str = "AllData";

/// Write the wide table to an xlsx file with a single `AllData` sheet
pub fn write_wide_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(WIDE_SHEET_NAME)?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let out_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, out_row, col_idx as u16, cell)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<()> {
    match cell {
        Cell::Null => { /* Leave cell empty */ }
        Cell::String(s) => {
            ws.write_string(row, col, s)?;
        }
        Cell::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        Cell::Float(f) if f.is_nan() => { /* Undefined ratio, leave empty */ }
        Cell::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        Cell::Bool(b) => {
            ws.write_string(row, col, &b.to_string())?;
        }
    }
    Ok(())
}

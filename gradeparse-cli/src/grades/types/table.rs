//! Ordered-column table with union concatenation

use super::Cell;

/// An in-memory table: named columns in a fixed order, rows of cells.
///
/// Rows are padded with nulls (or truncated) to the column count on insert,
/// so every row is exactly `columns.len()` cells wide.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given column labels
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by name, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding/truncating it to the column count
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    /// Rename a column in place; no-op if `from` is absent
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }

    /// Append a new column with one value per existing row.
    ///
    /// Short value lists are padded with nulls, so a column can be attached
    /// to an empty table as well.
    pub fn add_column(&mut self, name: &str, mut values: Vec<Cell>) {
        values.resize(self.rows.len(), Cell::Null);
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Append a new column holding the same value in every row
    pub fn add_const_column(&mut self, name: &str, value: Cell) {
        let values = vec![value; self.rows.len()];
        self.add_column(name, values);
    }

    /// Replace the values of an existing column
    pub fn set_column(&mut self, idx: usize, mut values: Vec<Cell>) {
        values.resize(self.rows.len(), Cell::Null);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row[idx] = value;
        }
    }

    /// Iterate the cells of one column
    pub fn column_cells(&self, idx: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Concatenate tables, unioning their columns.
    ///
    /// The combined column list is the union of all input columns in order of
    /// first appearance; cells for columns a table lacks become null. Row
    /// order within each input table is preserved, and tables are appended in
    /// the order given.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for col in &table.columns {
                if !columns.iter().any(|c| c == col) {
                    columns.push(col.clone());
                }
            }
        }

        let mut combined = Table::new(columns);
        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .map(|c| combined.column_index(c).expect("column is in the union"))
                .collect();
            for row in table.rows {
                let mut out = vec![Cell::Null; combined.columns.len()];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    out[target] = cell;
                }
                combined.rows.push(out);
            }
        }
        combined
    }
}

/// Grouping key for one row over the given column indices.
///
/// Null cells map to `None` so missing key components group together without
/// colliding with any real string value.
pub fn row_key(row: &[Cell], indices: &[usize]) -> Vec<Option<String>> {
    indices
        .iter()
        .map(|&i| match &row[i] {
            Cell::Null => None,
            cell => Some(cell.to_string()),
        })
        .collect()
}

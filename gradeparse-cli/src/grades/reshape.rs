//! Wide-form enrichment and wide-to-long reshaping

use std::collections::BTreeMap;
use std::collections::HashMap;

use super::columns::{GRADE_COLUMNS, SECTION_KEY_COLUMNS};
use super::types::{Cell, Table, row_key};

/// Annotate the wide table with derived columns.
///
/// `GradeTotal` is the row-wise sum over whichever grade columns are present,
/// skipping non-numeric cells. `EnrollDiff` (Enroll minus GradeTotal) is only
/// added when an `Enroll` column exists, and is null wherever `Enroll` is not
/// numeric. Adds nothing when no grade column is present.
pub fn add_wide_checks(table: &mut Table) {
    let present: Vec<usize> = GRADE_COLUMNS
        .iter()
        .filter_map(|g| table.column_index(g))
        .collect();
    if present.is_empty() {
        return;
    }

    let totals: Vec<i64> = table
        .rows
        .iter()
        .map(|row| {
            present
                .iter()
                .filter_map(|&idx| numeric_as_int(&row[idx]))
                .sum()
        })
        .collect();

    let enroll_idx = table.column_index("Enroll");
    table.add_column("GradeTotal", totals.iter().map(|&t| Cell::Int(t)).collect());

    if let Some(enroll_idx) = enroll_idx {
        let diffs: Vec<Cell> = table
            .rows
            .iter()
            .zip(&totals)
            .map(|(row, &total)| match row[enroll_idx].as_float() {
                Some(enroll) => Cell::Float(enroll - total as f64),
                None => Cell::Null,
            })
            .collect();
        table.add_column("EnrollDiff", diffs);
    }
}

fn numeric_as_int(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(i) => Some(*i),
        Cell::Float(f) if f.is_finite() => Some(*f as i64),
        _ => None,
    }
}

/// Count coercion for melted grade cells: nulls become 0, lossy otherwise
fn cell_to_count(cell: &Cell) -> i64 {
    match cell {
        Cell::Null => 0,
        Cell::Int(i) => *i,
        Cell::Float(f) if f.is_finite() => *f as i64,
        Cell::Float(_) => 0,
        Cell::Bool(b) => *b as i64,
        Cell::String(s) => s.trim().parse().unwrap_or(0),
    }
}

/// Melt the wide table into long/tidy form.
///
/// Every non-grade column is carried as an identifying attribute (provenance
/// and derived columns included, repeated per grade). The output gains
/// `Grade`, `Count` (nulls coerced to 0), and `Pct` (each row's count divided
/// by its section's total). A section with a zero total yields NaN, which the
/// validator flags via `ok_nonzero`; no special case here.
///
/// Grouping uses whichever section-key columns are present; when some are
/// missing the key degrades to the available subset.
pub fn to_long(wide: &Table) -> Table {
    let grade_indices: Vec<(&str, usize)> = GRADE_COLUMNS
        .iter()
        .filter_map(|&g| wide.column_index(g).map(|idx| (g, idx)))
        .collect();
    let id_indices: Vec<usize> = (0..wide.columns.len())
        .filter(|&idx| !GRADE_COLUMNS.contains(&wide.columns[idx].as_str()))
        .collect();

    let mut columns: Vec<String> = id_indices
        .iter()
        .map(|&idx| wide.columns[idx].clone())
        .collect();
    columns.push("Grade".to_string());
    columns.push("Count".to_string());
    let mut long = Table::new(columns);

    for (grade, grade_idx) in &grade_indices {
        for row in &wide.rows {
            let mut out: Vec<Cell> = id_indices.iter().map(|&idx| row[idx].clone()).collect();
            out.push(Cell::String(grade.to_string()));
            out.push(Cell::Int(cell_to_count(&row[*grade_idx])));
            long.push_row(out);
        }
    }

    add_pct(&mut long);
    long
}

/// Append `Pct` = Count / per-section total to the long table
fn add_pct(long: &mut Table) {
    let key_indices: Vec<usize> = SECTION_KEY_COLUMNS
        .iter()
        .filter_map(|k| long.column_index(k))
        .collect();
    let count_idx = match long.column_index("Count") {
        Some(idx) => idx,
        None => return,
    };

    let mut totals: HashMap<Vec<Option<String>>, i64> = HashMap::new();
    for row in &long.rows {
        let count = row[count_idx].as_int().unwrap_or(0);
        *totals.entry(row_key(row, &key_indices)).or_insert(0) += count;
    }

    let pct: Vec<Cell> = long
        .rows
        .iter()
        .map(|row| {
            let count = row[count_idx].as_int().unwrap_or(0) as f64;
            let total = totals
                .get(&row_key(row, &key_indices))
                .copied()
                .unwrap_or(0) as f64;
            Cell::Float(count / total)
        })
        .collect();
    long.add_column("Pct", pct);
}

/// Per-(SourceFile, Sheet) row counts for the wide table.
///
/// Empty when the provenance columns are missing.
pub fn sheet_row_counts(wide: &Table) -> Table {
    let mut counts = Table::new(vec![
        "SourceFile".to_string(),
        "Sheet".to_string(),
        "rows".to_string(),
    ]);
    let (Some(file_idx), Some(sheet_idx)) =
        (wide.column_index("SourceFile"), wide.column_index("Sheet"))
    else {
        return counts;
    };

    let mut groups: BTreeMap<Vec<Option<String>>, i64> = BTreeMap::new();
    for row in &wide.rows {
        *groups
            .entry(row_key(row, &[file_idx, sheet_idx]))
            .or_insert(0) += 1;
    }

    for (key, rows) in groups {
        let mut out: Vec<Cell> = key
            .into_iter()
            .map(|part| match part {
                Some(v) => Cell::String(v),
                None => Cell::Null,
            })
            .collect();
        out.push(Cell::Int(rows));
        counts.push_row(out);
    }
    counts
}

//! Per-section consistency checks over the long table

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use anyhow::{Result, bail};

use super::columns::SECTION_KEY_COLUMNS;
use super::types::{Cell, Table, row_key};

/// Tolerance band for a section's percentage sum
const PCT_SUM_RANGE: (f64, f64) = (0.99, 1.01);

/// Aggregate the long table per section key.
///
/// One output row per key, in sorted key order, with `total_counts`,
/// `pct_sum` (rounded to 3 decimals), `n_grade_bins`, `ok_pct_sum`, and
/// `ok_nonzero`. Sections failing a check are reported here, never removed
/// from the wide/long outputs. Uses the same degraded-key rule as the
/// reshaper when key columns are missing.
pub fn validate_long(long: &Table) -> Result<Table> {
    let key_indices: Vec<usize> = SECTION_KEY_COLUMNS
        .iter()
        .filter_map(|k| long.column_index(k))
        .collect();
    let (Some(grade_idx), Some(count_idx), Some(pct_idx)) = (
        long.column_index("Grade"),
        long.column_index("Count"),
        long.column_index("Pct"),
    ) else {
        bail!("Long table is missing Grade/Count/Pct columns");
    };

    struct SectionAgg {
        total_counts: i64,
        pct_sum: f64,
        grades: BTreeSet<String>,
    }

    let mut sections: BTreeMap<Vec<Option<String>>, SectionAgg> = BTreeMap::new();
    for row in &long.rows {
        let agg = sections
            .entry(row_key(row, &key_indices))
            .or_insert(SectionAgg {
                total_counts: 0,
                pct_sum: 0.0,
                grades: BTreeSet::new(),
            });
        agg.total_counts += row[count_idx].as_int().unwrap_or(0);
        agg.pct_sum += row[pct_idx].as_float().unwrap_or(f64::NAN);
        agg.grades.insert(row[grade_idx].to_string());
    }

    let mut columns: Vec<String> = key_indices
        .iter()
        .map(|&idx| long.columns[idx].clone())
        .collect();
    columns.extend(
        ["total_counts", "pct_sum", "n_grade_bins", "ok_pct_sum", "ok_nonzero"]
            .map(String::from),
    );
    let mut out = Table::new(columns);

    for (key, agg) in sections {
        let pct_sum = round3(agg.pct_sum);
        // NaN compares false on both bounds, so zero-total sections fail here too
        let ok_pct_sum = pct_sum >= PCT_SUM_RANGE.0 && pct_sum <= PCT_SUM_RANGE.1;

        let mut row: Vec<Cell> = key
            .into_iter()
            .map(|part| match part {
                Some(v) => Cell::String(v),
                None => Cell::Null,
            })
            .collect();
        row.push(Cell::Int(agg.total_counts));
        row.push(Cell::Float(pct_sum));
        row.push(Cell::Int(agg.grades.len() as i64));
        row.push(Cell::Bool(ok_pct_sum));
        row.push(Cell::Bool(agg.total_counts > 0));
        out.push_row(row);
    }

    Ok(out)
}

/// Sections failing either check in a validation table
pub fn count_failed_sections(validation: &Table) -> usize {
    let (Some(pct_idx), Some(nonzero_idx)) = (
        validation.column_index("ok_pct_sum"),
        validation.column_index("ok_nonzero"),
    ) else {
        return 0;
    };
    validation
        .rows
        .iter()
        .filter(|row| {
            row[pct_idx] == Cell::Bool(false) || row[nonzero_idx] == Cell::Bool(false)
        })
        .count()
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::reshape::to_long;

    fn s(v: &str) -> Cell {
        Cell::String(v.to_string())
    }

    fn long_fixture() -> Table {
        // Two sections: one consistent, one with a zero total
        let mut wide = Table::new(
            ["CourseID", "Term", "A", "B"]
                .map(String::from)
                .to_vec(),
        );
        wide.push_row(vec![s("CS101"), s("F24"), Cell::Int(6), Cell::Int(2)]);
        wide.push_row(vec![s("CS999"), s("F24"), Cell::Int(0), Cell::Null]);
        to_long(&wide)
    }

    #[test]
    fn test_consistent_section_passes_both_checks() {
        let validation = validate_long(&long_fixture()).unwrap();
        let course_idx = validation.column_index("CourseID").unwrap();
        let row = validation
            .rows
            .iter()
            .find(|row| row[course_idx] == s("CS101"))
            .unwrap();

        let idx = |name: &str| validation.column_index(name).unwrap();
        assert_eq!(row[idx("total_counts")], Cell::Int(8));
        assert_eq!(row[idx("pct_sum")], Cell::Float(1.0));
        assert_eq!(row[idx("n_grade_bins")], Cell::Int(2));
        assert_eq!(row[idx("ok_pct_sum")], Cell::Bool(true));
        assert_eq!(row[idx("ok_nonzero")], Cell::Bool(true));
    }

    #[test]
    fn test_zero_total_section_fails_both_checks() {
        let validation = validate_long(&long_fixture()).unwrap();
        let course_idx = validation.column_index("CourseID").unwrap();
        let row = validation
            .rows
            .iter()
            .find(|row| row[course_idx] == s("CS999"))
            .unwrap();

        let idx = |name: &str| validation.column_index(name).unwrap();
        assert_eq!(row[idx("total_counts")], Cell::Int(0));
        assert_eq!(row[idx("ok_pct_sum")], Cell::Bool(false));
        assert_eq!(row[idx("ok_nonzero")], Cell::Bool(false));
    }

    #[test]
    fn test_failed_section_count() {
        let validation = validate_long(&long_fixture()).unwrap();
        assert_eq!(count_failed_sections(&validation), 1);
        assert_eq!(validation.row_count(), 2);
    }

    #[test]
    fn test_missing_melt_columns_is_an_error() {
        let table = Table::new(vec!["CourseID".into()]);
        assert!(validate_long(&table).is_err());
    }
}

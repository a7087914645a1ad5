//! Column-name normalization and target-type coercion

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{Cell, Table};

/// Fixed grade-category columns, in output order
pub const GRADE_COLUMNS: [&str; 7] = ["A", "B", "C", "D", "F", "W", "I"];

/// Normalized columns forming the section identity
pub const SECTION_KEY_COLUMNS: [&str; 4] = ["CourseID", "Course_Name", "Term", "Section"];

/// Minimal labels a header row must contain (compared case/space-insensitively)
pub const REQUIRED_HEADER_LABELS: [&str; 9] = [
    "CourseID",
    "Course Name",
    "Term",
    "Section",
    "A",
    "B",
    "C",
    "D",
    "F",
];

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Za-z_]+").expect("valid regex"));

/// Canonicalize one raw column label.
///
/// Trims, collapses internal whitespace runs to a single underscore, and
/// strips everything outside `[0-9A-Za-z_]`. Idempotent: a normalized label
/// normalizes to itself.
pub fn normalize_label(raw: &str) -> String {
    let underscored = WHITESPACE_RUN.replace_all(raw.trim(), "_");
    NON_IDENT.replace_all(&underscored, "").into_owned()
}

/// Normalize all column labels of a table, then apply the `CourseName` alias.
///
/// The alias only fires when `Course_Name` is not already taken, so a sheet
/// carrying both keeps them distinct.
pub fn normalize_columns(table: &mut Table) {
    for col in table.columns.iter_mut() {
        *col = normalize_label(col);
    }
    if table.has_column("CourseName") && !table.has_column("Course_Name") {
        table.rename_column("CourseName", "Course_Name");
    }
}

/// A column that refused its target type and was left untouched
#[derive(Debug, Clone)]
pub struct TypeCoercionWarning {
    pub column: String,
    pub target: &'static str,
    pub reason: String,
}

impl std::fmt::Display for TypeCoercionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "column '{}' left uncoerced (target {}): {}",
            self.column, self.target, self.reason
        )
    }
}

/// Apply the fixed type map: text for the section key columns, nullable
/// integer for `Enroll` and the grade columns.
///
/// Coercion is all-or-nothing per column: if any cell refuses the target
/// type the column keeps its original representation and a warning is
/// returned. Nothing here ever fails the load.
pub fn coerce_types(table: &mut Table) -> Vec<TypeCoercionWarning> {
    let mut warnings = Vec::new();

    for col in SECTION_KEY_COLUMNS {
        if let Some(idx) = table.column_index(col) {
            let values = table.column_cells(idx).map(coerce_cell_text).collect();
            table.set_column(idx, values);
        }
    }

    let int_columns = std::iter::once("Enroll").chain(GRADE_COLUMNS);
    for col in int_columns {
        let Some(idx) = table.column_index(col) else {
            continue;
        };
        let attempt: Result<Vec<Cell>, String> =
            table.column_cells(idx).map(coerce_cell_int).collect();
        match attempt {
            Ok(values) => table.set_column(idx, values),
            Err(reason) => warnings.push(TypeCoercionWarning {
                column: col.to_string(),
                target: "integer",
                reason,
            }),
        }
    }

    warnings
}

/// Text coercion never fails; nulls stay null
fn coerce_cell_text(cell: &Cell) -> Cell {
    match cell {
        Cell::Null => Cell::Null,
        Cell::String(s) => Cell::String(s.clone()),
        other => Cell::String(other.to_string()),
    }
}

fn coerce_cell_int(cell: &Cell) -> Result<Cell, String> {
    match cell {
        Cell::Null => Ok(Cell::Null),
        Cell::Int(i) => Ok(Cell::Int(*i)),
        Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(Cell::Int(*f as i64)),
        Cell::Float(f) => Err(format!("{} is not a whole number", f)),
        Cell::Bool(b) => Ok(Cell::Int(*b as i64)),
        Cell::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Cell::Int)
            .map_err(|_| format!("cannot parse '{}' as an integer", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Course Name"), "Course_Name");
        assert_eq!(normalize_label("  Enroll  "), "Enroll");
        assert_eq!(normalize_label("A %"), "A_");
        assert_eq!(normalize_label("Grade (F)"), "Grade_F");
        assert_eq!(normalize_label("Term\t 2024"), "Term_2024");
    }

    #[test]
    fn test_normalize_label_idempotent() {
        for raw in ["Course Name", " weird  col!! ", "already_clean", "A %", ""] {
            let once = normalize_label(raw);
            assert_eq!(normalize_label(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_course_name_alias() {
        let mut table = Table::new(vec!["CourseName".into(), "Term".into()]);
        normalize_columns(&mut table);
        assert_eq!(table.columns, vec!["Course_Name", "Term"]);
    }

    #[test]
    fn test_course_name_alias_skipped_when_taken() {
        let mut table = Table::new(vec!["CourseName".into(), "Course Name".into()]);
        normalize_columns(&mut table);
        // "Course Name" normalizes to Course_Name, so the alias must not fire
        assert_eq!(table.columns, vec!["CourseName", "Course_Name"]);
    }

    #[test]
    fn test_coerce_int_column() {
        let mut table = Table::new(vec!["Enroll".into()]);
        table.push_row(vec![Cell::Float(20.0)]);
        table.push_row(vec![Cell::String(" 7 ".into())]);
        table.push_row(vec![Cell::Null]);

        let warnings = coerce_types(&mut table);
        assert!(warnings.is_empty());
        let values: Vec<_> = table.column_cells(0).cloned().collect();
        assert_eq!(values, vec![Cell::Int(20), Cell::Int(7), Cell::Null]);
    }

    #[test]
    fn test_failed_coercion_leaves_column_untouched() {
        let mut table = Table::new(vec!["A".into()]);
        table.push_row(vec![Cell::Int(5)]);
        table.push_row(vec![Cell::String("five".into())]);

        let warnings = coerce_types(&mut table);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].column, "A");
        let values: Vec<_> = table.column_cells(0).cloned().collect();
        assert_eq!(values, vec![Cell::Int(5), Cell::String("five".into())]);
    }

    #[test]
    fn test_key_columns_coerced_to_text() {
        let mut table = Table::new(vec!["Section".into()]);
        table.push_row(vec![Cell::Int(101)]);
        table.push_row(vec![Cell::Null]);

        coerce_types(&mut table);
        let values: Vec<_> = table.column_cells(0).cloned().collect();
        assert_eq!(values, vec![Cell::String("101".into()), Cell::Null]);
    }
}

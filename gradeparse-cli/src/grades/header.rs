//! Header-row detection for raw sheet grids

use std::collections::HashSet;

use super::types::Cell;

/// No row in a sheet's grid carried the required header labels
#[derive(Debug, Clone)]
pub struct HeaderNotFoundError {
    pub file: String,
    pub sheet: String,
    pub required: Vec<String>,
}

impl std::fmt::Display for HeaderNotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Header row not found in {} / '{}'. Looked for labels like: {}",
            self.file,
            self.sheet,
            self.required.join(", ")
        )
    }
}

impl std::error::Error for HeaderNotFoundError {}

/// Fold a label for comparison: lowercase with spaces removed
fn fold_label(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "")
}

/// Find the zero-based index of the first row whose non-empty cell values
/// (case- and space-insensitively) form a superset of `required`.
///
/// Used when the caller gives no explicit header row.
pub fn detect_header_row(
    grid: &[Vec<Cell>],
    required: &[&str],
    file: &str,
    sheet: &str,
) -> Result<usize, HeaderNotFoundError> {
    let wanted: HashSet<String> = required.iter().map(|r| fold_label(r)).collect();

    for (idx, row) in grid.iter().enumerate() {
        let labels: HashSet<String> = row
            .iter()
            .filter(|cell| !cell.is_null())
            .map(|cell| fold_label(&cell.to_string()))
            .collect();
        if wanted.is_subset(&labels) {
            return Ok(idx);
        }
    }

    Err(HeaderNotFoundError {
        file: file.to_string(),
        sheet: sheet.to_string(),
        required: required.iter().map(|r| r.to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(labels: &[&str]) -> Vec<Cell> {
        labels.iter().map(|l| Cell::String(l.to_string())).collect()
    }

    #[test]
    fn test_detects_first_matching_row() {
        let grid = vec![
            text_row(&["Some Title"]),
            vec![],
            text_row(&["notes", "more notes"]),
            text_row(&["CourseID", "course name", "TERM", "Section", "extra"]),
        ];
        let row = detect_header_row(
            &grid,
            &["CourseID", "Course Name", "Term", "Section"],
            "f.xlsx",
            "Fall2024",
        )
        .unwrap();
        assert_eq!(row, 3);
    }

    #[test]
    fn test_ignores_null_cells() {
        let grid = vec![vec![
            Cell::Null,
            Cell::String("CourseID".into()),
            Cell::String("Term".into()),
        ]];
        let row = detect_header_row(&grid, &["CourseID", "Term"], "f.xlsx", "S1").unwrap();
        assert_eq!(row, 0);
    }

    #[test]
    fn test_missing_header_is_an_error() {
        let grid = vec![text_row(&["CourseID", "Term"])];
        let err = detect_header_row(&grid, &["CourseID", "Term", "Section"], "f.xlsx", "Fall2024")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("f.xlsx"));
        assert!(message.contains("Fall2024"));
        assert!(message.contains("Section"));
    }
}

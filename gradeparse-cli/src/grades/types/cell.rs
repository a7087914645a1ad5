//! Dynamic cell value representation for spreadsheet tables

/// A single cell value as read from (or written to) a spreadsheet.
///
/// Tables carry no per-column type guarantee; any column may hold any mix of
/// these variants until type coercion runs.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty/missing value
    Null,
    /// Text value
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point value (may be NaN for undefined ratios)
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl Cell {
    /// Check if this cell is null
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Try to get as integer (exact only)
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            Cell::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::String(s) => write!(f, "{}", s),
            Cell::Int(i) => write!(f, "{}", i),
            // NaN renders empty, like a missing value in delimited output
            Cell::Float(v) if v.is_nan() => Ok(()),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(Cell::String("x".into()).to_string(), "x");
        assert_eq!(Cell::Int(42).to_string(), "42");
        assert_eq!(Cell::Float(0.25).to_string(), "0.25");
        assert_eq!(Cell::Float(f64::NAN).to_string(), "");
        assert_eq!(Cell::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_as_float_widens_int() {
        assert_eq!(Cell::Int(3).as_float(), Some(3.0));
        assert_eq!(Cell::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Cell::String("3".into()).as_float(), None);
    }
}

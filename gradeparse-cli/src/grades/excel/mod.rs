//! Excel workbook reading and writing

pub mod reader;
pub mod writer;

pub use reader::{InvalidSheetSelectorError, load_workbook, resolve_sheet_selection};
pub use writer::write_wide_xlsx;

//! Core value and table types for the grade pipeline

pub mod cell;
pub mod table;

pub use cell::Cell;
pub use table::{Table, row_key};

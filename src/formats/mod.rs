//! Source file parsing.

pub mod delimited;

pub use delimited::{ParsedTable, Record};

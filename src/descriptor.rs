//! Load descriptors: the static per-file mapping configuration.
//!
//! One `LoadDescriptor` describes one file-to-table load. The ordered column
//! list serves four roles at once: it is the rename table (source name to
//! destination name), the selection set (source columns not listed are
//! dropped), the destination column order (list order), and the numeric
//! coercion table.

use std::collections::HashSet;
use std::path::PathBuf;

use encoding_rs::Encoding;
use thiserror::Error;

/// Numeric coercion applied to a source column while materializing rows.
///
/// Columns without a coercion stay text. Empty cells become NULL in every
/// case; see the loader for the exact normalization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Keep the field as text.
    None,
    /// Parse the field as a 64-bit signed integer.
    Integer,
    /// Parse the field as a 64-bit float.
    Float,
}

/// One column of a load: source header name, destination column name, and
/// the coercion to apply.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub source: String,
    pub dest: String,
    pub coerce: Coercion,
}

impl ColumnSpec {
    pub fn text(source: &str, dest: &str) -> Self {
        Self::new(source, dest, Coercion::None)
    }

    pub fn integer(source: &str, dest: &str) -> Self {
        Self::new(source, dest, Coercion::Integer)
    }

    pub fn float(source: &str, dest: &str) -> Self {
        Self::new(source, dest, Coercion::Float)
    }

    fn new(source: &str, dest: &str, coerce: Coercion) -> Self {
        Self {
            source: source.to_string(),
            dest: dest.to_string(),
            coerce,
        }
    }
}

/// Static record describing one file-to-table load.
#[derive(Debug, Clone)]
pub struct LoadDescriptor {
    /// Path to the source file.
    pub source_path: PathBuf,
    /// Destination table name.
    pub table: String,
    /// Fixed character encoding of the source file.
    pub encoding: &'static Encoding,
    /// Ordered column mappings; order defines the destination column order.
    pub columns: Vec<ColumnSpec>,
}

/// Validation failures for a descriptor.
///
/// Descriptor column names are externally supplied configuration, so they are
/// checked for internal consistency here and against the actual file header
/// at load time.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor for table {table} maps no columns")]
    Empty { table: String },

    #[error("descriptor for table {table} lists source column '{column}' twice")]
    DuplicateSource { table: String, column: String },

    #[error("descriptor for table {table} lists destination column '{column}' twice")]
    DuplicateDest { table: String, column: String },
}

impl LoadDescriptor {
    /// Check internal consistency: at least one column, no duplicate source
    /// names, no duplicate destination names.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.columns.is_empty() {
            return Err(DescriptorError::Empty {
                table: self.table.clone(),
            });
        }

        let mut sources = HashSet::new();
        let mut dests = HashSet::new();
        for col in &self.columns {
            if !sources.insert(col.source.as_str()) {
                return Err(DescriptorError::DuplicateSource {
                    table: self.table.clone(),
                    column: col.source.clone(),
                });
            }
            if !dests.insert(col.dest.as_str()) {
                return Err(DescriptorError::DuplicateDest {
                    table: self.table.clone(),
                    column: col.dest.clone(),
                });
            }
        }

        Ok(())
    }

    /// Destination column names in declared order.
    pub fn dest_columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.dest.as_str()).collect()
    }
}

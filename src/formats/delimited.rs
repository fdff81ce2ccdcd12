//! Delimited (CSV) file reading with a fixed character encoding.
//!
//! Each source file is read in one pass: the raw bytes are decoded from the
//! deployment's encoding, then parsed as headered CSV. The files this tool
//! ingests are small seed data sets, so there is no chunking or streaming.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use thiserror::Error;

/// A single record (row) from the file.
#[derive(Debug, Clone)]
pub struct Record {
    pub fields: Vec<String>,
}

/// A fully parsed source file: header names plus data records.
#[derive(Debug)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

#[derive(Debug, Error)]
pub enum DelimitedError {
    #[error("file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: input is not valid {encoding}", .path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("malformed CSV in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Read a delimited file, decoding it from the given encoding.
///
/// The first row is the header. A decode that produces replacement
/// characters is treated as an error rather than silently corrupting data.
pub async fn read_table(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<ParsedTable, DelimitedError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DelimitedError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DelimitedError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(DelimitedError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        });
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|source| DelimitedError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|source| DelimitedError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        records.push(Record {
            fields: record.iter().map(|s| s.to_string()).collect(),
        });
    }

    Ok(ParsedTable { headers, records })
}

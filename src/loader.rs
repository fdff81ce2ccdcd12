//! The load-one-file procedure.
//!
//! Parses one source file, projects it through the descriptor's column
//! mappings, coerces and null-normalizes every cell, then bulk-inserts the
//! rows inside a single transaction: commit on success, full rollback on any
//! database error. Every failure is scoped to the file being loaded.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::INSERT_BATCH_ROWS;
use crate::db::{Cell, Db};
use crate::descriptor::{Coercion, LoadDescriptor};
use crate::formats::delimited::{self, DelimitedError, Record};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to parse {}: {detail}", .path.display())]
    Parse { path: PathBuf, detail: String },

    #[error("schema mismatch for table {table}: {detail}")]
    Schema { table: String, detail: String },

    #[error("database error loading table {table}: {source}")]
    Database {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Successful outcome of one file load.
#[derive(Debug)]
pub struct LoadReport {
    pub table: String,
    pub rows_inserted: u64,
}

/// Load one file into its destination table.
///
/// Rows are inserted in batched multi-row statements inside one explicit
/// transaction. A header-only source file is a successful load of zero
/// records and never touches the database.
pub async fn load(db: &mut Db, desc: &LoadDescriptor) -> Result<LoadReport, LoadError> {
    // Descriptor column names are externally supplied; check them before
    // trusting them against the file.
    desc.validate().map_err(|e| LoadError::Schema {
        table: desc.table.clone(),
        detail: e.to_string(),
    })?;

    let parsed = match delimited::read_table(&desc.source_path, desc.encoding).await {
        Ok(parsed) => parsed,
        Err(DelimitedError::NotFound { path }) => return Err(LoadError::FileNotFound { path }),
        Err(DelimitedError::Decode { path, encoding }) => {
            return Err(LoadError::Parse {
                path,
                detail: format!("input is not valid {encoding}"),
            });
        }
        Err(DelimitedError::Io { path, source }) => {
            return Err(LoadError::Parse {
                path,
                detail: source.to_string(),
            });
        }
        Err(DelimitedError::Csv { path, source }) => {
            return Err(LoadError::Parse {
                path,
                detail: source.to_string(),
            });
        }
    };

    let indices = project(&parsed.headers, desc)?;
    let rows = materialize(&parsed.records, &indices, desc)?;

    if rows.is_empty() {
        info!(table = %desc.table, "source file has no data rows");
        return Ok(LoadReport {
            table: desc.table.clone(),
            rows_inserted: 0,
        });
    }

    let columns = desc.dest_columns();

    db.begin().await.map_err(|source| LoadError::Database {
        table: desc.table.clone(),
        source,
    })?;

    let mut inserted = 0u64;
    for chunk in rows.chunks(INSERT_BATCH_ROWS) {
        let sql = build_insert_sql(&desc.table, &columns, chunk.len());
        match db.execute_insert(&sql, chunk).await {
            Ok(affected) => inserted += affected,
            Err(source) => {
                // Any database error discards the whole file's insert.
                if let Err(rb) = db.rollback().await {
                    warn!(table = %desc.table, error = %rb, "rollback failed after insert error");
                }
                return Err(LoadError::Database {
                    table: desc.table.clone(),
                    source,
                });
            }
        }
    }

    db.commit().await.map_err(|source| LoadError::Database {
        table: desc.table.clone(),
        source,
    })?;

    Ok(LoadReport {
        table: desc.table.clone(),
        rows_inserted: inserted,
    })
}

/// Resolve each descriptor source column to its index in the parsed header.
fn project(headers: &[String], desc: &LoadDescriptor) -> Result<Vec<usize>, LoadError> {
    desc.columns
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h == &col.source)
                .ok_or_else(|| LoadError::Schema {
                    table: desc.table.clone(),
                    detail: format!(
                        "source column '{}' not found in header of {}",
                        col.source,
                        desc.source_path.display()
                    ),
                })
        })
        .collect()
}

/// Turn parsed records into rows of typed cells in destination column order.
fn materialize(
    records: &[Record],
    indices: &[usize],
    desc: &LoadDescriptor,
) -> Result<Vec<Vec<Cell>>, LoadError> {
    let mut rows = Vec::with_capacity(records.len());

    for (row_idx, record) in records.iter().enumerate() {
        let mut row = Vec::with_capacity(indices.len());
        for (spec, &col_idx) in desc.columns.iter().zip(indices) {
            let raw = record.fields.get(col_idx).map(String::as_str).unwrap_or("");
            let cell = coerce(raw, spec.coerce).map_err(|reason| LoadError::Parse {
                path: desc.source_path.clone(),
                // line 1 is the header
                detail: format!("row {}, column '{}': {}", row_idx + 2, spec.source, reason),
            })?;
            row.push(cell);
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Coerce a raw field. Empty cells become NULL for every column kind; a NaN
/// input in a float column also stores NULL rather than a NaN.
fn coerce(raw: &str, coercion: Coercion) -> Result<Cell, String> {
    match coercion {
        Coercion::Integer => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Cell::Int(None));
            }
            trimmed
                .parse::<i64>()
                .map(|v| Cell::Int(Some(v)))
                .map_err(|e| format!("invalid integer '{raw}': {e}"))
        }
        Coercion::Float => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Cell::Float(None));
            }
            let value: f64 = trimmed
                .parse()
                .map_err(|e| format!("invalid number '{raw}': {e}"))?;
            Ok(Cell::Float(if value.is_nan() { None } else { Some(value) }))
        }
        Coercion::None => {
            if raw.is_empty() {
                Ok(Cell::Text(None))
            } else {
                Ok(Cell::Text(Some(raw.to_string())))
            }
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a batched INSERT: INSERT INTO "t" ("a", "b") VALUES ($1, $2), ($3, $4), ...
fn build_insert_sql(table: &str, columns: &[&str], row_count: usize) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut value_groups = Vec::with_capacity(row_count);
    let mut param_idx = 1;
    for _ in 0..row_count {
        let placeholders: Vec<String> = (0..columns.len())
            .map(|_| {
                let placeholder = format!("${param_idx}");
                param_idx += 1;
                placeholder
            })
            .collect();
        value_groups.push(format!("({})", placeholders.join(", ")));
    }

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote_ident(table),
        column_list,
        value_groups.join(", ")
    )
}

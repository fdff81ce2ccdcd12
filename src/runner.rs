//! High-level runner API: the sequential driver for a seeding run.
//!
//! Connects once, loads every descriptor in order, contains per-file
//! failures, and closes the connection exactly once. This is the primary API
//! for the binary and for embedders.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::db::{self, ConnectError, ConnectParams, Db};
use crate::descriptor::LoadDescriptor;
use crate::loader::{self, LoadError, LoadReport};

/// Outcome of one descriptor's load attempt.
#[derive(Debug)]
pub struct FileOutcome {
    pub table: String,
    pub source_path: PathBuf,
    pub result: Result<LoadReport, LoadError>,
}

/// Aggregate outcome of a whole run.
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    pub fn files_loaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn files_failed(&self) -> usize {
        self.outcomes.len() - self.files_loaded()
    }

    pub fn records_loaded(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.rows_inserted)
            .sum()
    }
}

/// Run a full seeding pass: connect, load every descriptor in order, close.
///
/// A connection failure aborts the run before any load is attempted. Any
/// per-file failure is contained and the remaining files still load.
pub async fn run(
    params: &ConnectParams,
    descriptors: &[LoadDescriptor],
) -> Result<RunReport, ConnectError> {
    let db = match db::connect(params).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "connection failed; no files will be loaded");
            return Err(e);
        }
    };

    Ok(run_with_connection(db, descriptors).await)
}

/// Drive the loads over an already-open connection.
///
/// Takes ownership of the connection and closes it on every path, after the
/// last descriptor has been attempted.
pub async fn run_with_connection(mut db: Db, descriptors: &[LoadDescriptor]) -> RunReport {
    let mut outcomes = Vec::with_capacity(descriptors.len());

    for desc in descriptors {
        info!(
            file = %desc.source_path.display(),
            table = %desc.table,
            "loading file"
        );

        let result = loader::load(&mut db, desc).await;
        match &result {
            Ok(report) => {
                info!(
                    table = %desc.table,
                    rows = report.rows_inserted,
                    "load complete"
                );
            }
            Err(e) => {
                warn!(
                    file = %desc.source_path.display(),
                    table = %desc.table,
                    error = %e,
                    "load failed; continuing with remaining files"
                );
            }
        }

        outcomes.push(FileOutcome {
            table: desc.table.clone(),
            source_path: desc.source_path.clone(),
            result,
        });
    }

    if let Err(e) = db.close().await {
        warn!(error = %e, "error closing database connection");
    }

    RunReport { outcomes }
}

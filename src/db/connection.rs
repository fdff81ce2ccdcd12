//! Single-connection database access over the sqlx::Postgres driver.
//!
//! The whole run uses exactly one connection: opened once, passed by mutable
//! reference into each file load, closed once at the end. A SQLite in-memory
//! variant backs the test suite.

use derive_builder::Builder;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use thiserror::Error;
use tracing::info;

use crate::config::CONNECT_TIMEOUT;

/// Connection parameters, injected by the caller rather than read from
/// process-wide globals.
#[derive(Builder, Debug, Clone)]
pub struct ConnectParams {
    #[builder(setter(into))]
    host: String,
    #[builder(default = "5432")]
    port: u16,
    #[builder(setter(into))]
    database: String,
    #[builder(setter(into))]
    username: String,
    #[builder(setter(into))]
    password: String,
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("timed out connecting to {host}:{port}")]
    Timeout { host: String, port: u16 },

    #[error("failed to connect to {host}:{port}/{database}: {source}")]
    Connect {
        host: String,
        port: u16,
        database: String,
        #[source]
        source: sqlx::Error,
    },
}

/// A value bound into one INSERT placeholder. `None` in any variant binds a
/// typed SQL NULL, never an empty string or zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
}

/// The single live database connection for a run.
pub enum Db {
    Postgres(PgConnection),
    #[cfg(test)]
    Sqlite(sqlx::SqliteConnection),
}

/// Attempt exactly one connection with the given parameters.
///
/// No retry, no pooling. On failure the caller decides whether to proceed;
/// in this tool a failed connect aborts the run before any load.
pub async fn connect(params: &ConnectParams) -> Result<Db, ConnectError> {
    let options = PgConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .database(&params.database)
        .username(&params.username)
        .password(&params.password);

    let conn = tokio::time::timeout(CONNECT_TIMEOUT, options.connect())
        .await
        .map_err(|_| ConnectError::Timeout {
            host: params.host.clone(),
            port: params.port,
        })?
        .map_err(|source| ConnectError::Connect {
            host: params.host.clone(),
            port: params.port,
            database: params.database.clone(),
            source,
        })?;

    info!(
        host = %params.host,
        port = params.port,
        database = %params.database,
        "database connection established"
    );

    Ok(Db::Postgres(conn))
}

impl Db {
    /// Create an in-memory SQLite connection for testing, with foreign-key
    /// enforcement on so ordering contracts can be exercised.
    #[cfg(test)]
    pub async fn sqlite_in_memory() -> Result<Self, sqlx::Error> {
        use sqlx::sqlite::SqliteConnectOptions;
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let conn = options.connect().await?;
        Ok(Db::Sqlite(conn))
    }

    /// Execute a statement with no bind parameters (DDL, transaction control).
    pub async fn execute_raw(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        match self {
            Db::Postgres(conn) => Ok(sqlx::query(sql).execute(&mut *conn).await?.rows_affected()),
            #[cfg(test)]
            Db::Sqlite(conn) => Ok(sqlx::query(sql).execute(&mut *conn).await?.rows_affected()),
        }
    }

    pub async fn begin(&mut self) -> Result<(), sqlx::Error> {
        self.execute_raw("BEGIN").await.map(|_| ())
    }

    pub async fn commit(&mut self) -> Result<(), sqlx::Error> {
        self.execute_raw("COMMIT").await.map(|_| ())
    }

    pub async fn rollback(&mut self) -> Result<(), sqlx::Error> {
        self.execute_raw("ROLLBACK").await.map(|_| ())
    }

    /// Execute a batched INSERT, binding every cell of every row in order.
    ///
    /// `sql` uses PostgreSQL-style `$n` placeholders; they are rewritten to
    /// `?` for the SQLite test backend.
    pub async fn execute_insert(
        &mut self,
        sql: &str,
        rows: &[Vec<Cell>],
    ) -> Result<u64, sqlx::Error> {
        match self {
            Db::Postgres(conn) => {
                let mut query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> =
                    sqlx::query(sql);
                for row in rows {
                    for cell in row {
                        query = match cell {
                            Cell::Int(v) => query.bind(*v),
                            Cell::Float(v) => query.bind(*v),
                            Cell::Text(v) => query.bind(v.as_deref()),
                        };
                    }
                }
                Ok(query.execute(&mut *conn).await?.rows_affected())
            }
            #[cfg(test)]
            Db::Sqlite(conn) => {
                let sqlite_sql = to_sqlite_placeholders(sql);
                let mut query: sqlx::query::Query<
                    '_,
                    sqlx::Sqlite,
                    sqlx::sqlite::SqliteArguments<'_>,
                > = sqlx::query(&sqlite_sql);
                for row in rows {
                    for cell in row {
                        query = match cell {
                            Cell::Int(v) => query.bind(*v),
                            Cell::Float(v) => query.bind(*v),
                            Cell::Text(v) => query.bind(v.as_deref()),
                        };
                    }
                }
                Ok(query.execute(&mut *conn).await?.rows_affected())
            }
        }
    }

    /// Close the connection. Called exactly once at the end of a run.
    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            Db::Postgres(conn) => conn.close().await,
            #[cfg(test)]
            Db::Sqlite(conn) => conn.close().await,
        }
    }
}

/// Convert PostgreSQL-style placeholders ($1, $2, ...) to SQLite-style (?, ?, ...)
#[cfg(test)]
fn to_sqlite_placeholders(sql: &str) -> String {
    let mut result = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                chars.next();
            }
            result.push('?');
        } else {
            result.push(ch);
        }
    }

    result
}

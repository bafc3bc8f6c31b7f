use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors returned by [`AccountStore`](crate::store::AccountStore) operations.
///
/// Variants that originate in SQLite keep the driver error as their source.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create schema: {0}")]
    Schema(#[source] rusqlite::Error),

    #[error("failed to close database: {0}")]
    Close(#[source] rusqlite::Error),

    #[error("failed to prepare query: {0}")]
    QueryPrepare(#[source] rusqlite::Error),

    #[error("query execution failed: {0}")]
    QueryExec(#[source] rusqlite::Error),

    #[error("failed to decode row {row}: {reason}")]
    RowDecode { row: usize, reason: String },

    #[error("accounts table holds more than {capacity} rows")]
    CapacityExceeded { capacity: usize },

    #[error("transaction failed: {0}")]
    Transaction(#[source] rusqlite::Error),

    #[error("failed to prepare statement: {0}")]
    Statement(#[source] rusqlite::Error),

    #[error("write failed: {reason}")]
    Write {
        /// Position in the saved slice, when the failure concerns one account.
        index: Option<usize>,
        reason: String,
        #[source]
        source: Option<rusqlite::Error>,
    },
}

impl StoreError {
    /// Returns the underlying SQLite error, if any.
    pub fn sqlite_error(&self) -> Option<&rusqlite::Error> {
        match self {
            StoreError::Open { source, .. } => Some(source),
            StoreError::Schema(e)
            | StoreError::Close(e)
            | StoreError::QueryPrepare(e)
            | StoreError::QueryExec(e)
            | StoreError::Transaction(e)
            | StoreError::Statement(e) => Some(e),
            StoreError::Write { source, .. } => source.as_ref(),
            StoreError::RowDecode { .. } | StoreError::CapacityExceeded { .. } => None,
        }
    }

    /// True when SQLite reported a busy or locked database. The store never
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.sqlite_error().and_then(|e| e.sqlite_error_code()),
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

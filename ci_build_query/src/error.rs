//! Error type for query execution.
//!
//! Only infrastructure faults surface here. A build whose buildable cannot
//! be seen, a deleted plan and a stale target are all expressed by filtering
//! or a `None` attachment instead.

use thiserror::Error;

use crate::cursor::CursorError;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// Failure reported by a caller-supplied collaborator.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type QueryResult<T> = Result<T, QueryError>;

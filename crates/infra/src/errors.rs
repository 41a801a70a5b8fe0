//! Infrastructure-level error wrapper.
//!
//! Collects the driver-specific failures (reqwest, rusqlite, r2d2, task
//! joins) behind one type. The store manager propagates with `?` and takes
//! the default mapping below; call sites with a more specific context
//! re-tag instead: the credential cache maps transport failures to `Auth`,
//! the gateway client to `Delivery`, the repositories to `Extraction` or
//! `ReconciliationLookup`.

use finsync_domain::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sql error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Default mapping for contexts without a more specific taxonomy kind.
impl From<InfraError> for SyncError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Sql(_) | InfraError::Pool(_) => SyncError::Connection(err.to_string()),
            InfraError::Http(_) | InfraError::Join(_) => SyncError::Internal(err.to_string()),
        }
    }
}

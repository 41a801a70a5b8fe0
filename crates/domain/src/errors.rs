//! Error types used throughout the pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for finsync.
///
/// The first five variants mirror the pipeline's failure taxonomy; fatal
/// kinds abort the run, non-fatal kinds are absorbed at the per-contract
/// boundary and counted.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SyncError {
    /// Store unreachable. Fatal to the run.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query or streaming error mid-read. Fatal; partial results are
    /// discarded.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Identity endpoint unreachable or returned no usable token. Fatal;
    /// no contracts processed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Target-entry lookup failed. Non-fatal; the contract falls back to
    /// synthetic defaults.
    #[error("Reconciliation lookup error: {0}")]
    ReconciliationLookup(String),

    /// Transport error or non-success status from the upsert endpoint.
    /// Recorded per contract, non-fatal to the run.
    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether this error aborts the entire run.
    ///
    /// Non-fatal kinds are caught at the per-contract boundary; everything
    /// else propagates out of the coordinator.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ReconciliationLookup(_) | Self::Delivery(_))
    }
}

/// Result type alias for finsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

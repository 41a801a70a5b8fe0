//! Infrastructure port interfaces.
//!
//! Every external collaborator of the pipeline — the source ledger, the
//! target-entry directory, the upsert gateway and its credential source —
//! is reached through one of these traits. `finsync-infra` provides the
//! production implementations; tests substitute mocks.

use async_trait::async_trait;
use finsync_domain::{ClassifiedItem, LedgerQuery, RawPaymentRow, ReconciliationResult, Result};

/// Read access to the source ledger's contract payment rows.
///
/// Results are ordered ascending by contract identifier (then item index),
/// which the aggregator relies on for streaming group-by.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Fetch one chunk of rows matching `query`, starting `offset` rows in.
    ///
    /// The query carries concrete values only (the caller resolves any
    /// relative window to a calendar day up front). A chunk shorter than
    /// `limit` marks the end of the result set.
    async fn fetch_chunk(
        &self,
        query: &LedgerQuery,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RawPaymentRow>>;

    /// Verify the store is reachable before the run starts.
    async fn health_check(&self) -> Result<()>;
}

/// Point lookup into the target system's existing financial entries.
#[async_trait]
pub trait EntryDirectory: Send + Sync {
    /// Return the earliest-keyed entry for the contract and its due date
    /// (`DD/MM/YYYY`), or an absent result when the contract has never been
    /// pushed. No-match is not an error.
    async fn find_earliest_entry(&self, contract_id: &str) -> Result<ReconciliationResult>;
}

/// Delivery of one contract's items to the target system's upsert endpoint.
#[async_trait]
pub trait UpsertGateway: Send + Sync {
    /// Acquire a usable credential before any contract is processed.
    /// Failure here is fatal to the run.
    async fn preflight(&self) -> Result<()>;

    /// Build and send the upsert payload for one contract.
    ///
    /// `entry_key` is the reconciled target key (or the sentinel), and
    /// `due_date` is stamped onto a private copy of every item before the
    /// payload is serialized.
    async fn deliver(
        &self,
        contract_id: &str,
        entry_key: &str,
        due_date: &str,
        items: &[ClassifiedItem],
    ) -> Result<()>;
}

/// Provides bearer tokens for gateway calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Retrieve a token valid for at least the safety margin.
    async fn access_token(&self) -> Result<String>;
}

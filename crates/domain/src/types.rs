//! Common data types used throughout the pipeline

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SyncError};

/// Opaque key identifying one source contract
pub type ContractId = String;

/// One record from the source ledger, as returned by the store query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPaymentRow {
    pub contract_id: ContractId,
    pub item_index: i64,
    pub method_code: i64,
    pub method_description: String,
    pub amount: f64,
    pub inserted_at: DateTime<Utc>,
}

/// A payment row translated into the target schema.
///
/// Immutable after creation except for `due_date`, which is written exactly
/// once while the delivery payload is prepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    /// Target payment-type code
    pub payment_type_code: i64,
    /// Installment count, always >= 1
    pub installments: u32,
    /// Term in days, >= 0
    pub term_days: u32,
    /// Monetary amount rendered with exactly two decimals
    pub amount: String,
    /// Due date in `DD/MM/YYYY`, unset until delivery preparation
    pub due_date: Option<String>,
}

/// A classified row still carrying its source identity, as yielded by the
/// extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRow {
    pub contract_id: ContractId,
    pub item_index: i64,
    pub item: ClassifiedItem,
}

/// All classified items belonging to one contract, in source row order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractGroup {
    pub contract_id: ContractId,
    pub items: Vec<ClassifiedItem>,
}

/// Outcome of the target-system lookup for one contract.
///
/// Both fields absent is a valid, common result: the contract has never
/// been pushed before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Existing target-entry key, if any
    pub entry_key: Option<String>,
    /// Due date of that entry in `DD/MM/YYYY`, if any
    pub due_date: Option<String>,
}

impl ReconciliationResult {
    /// The no-match outcome.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_absent(&self) -> bool {
        self.entry_key.is_none()
    }
}

/// Which slice of the source ledger a run extracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFilter {
    /// Rows whose insertion date is exactly `days_back` days before the
    /// run's calendar date
    Window { days_back: u32 },
    /// An explicit list of contract identifiers
    Contracts(Vec<i64>),
}

impl ExtractionFilter {
    /// Pin the filter to concrete query values.
    ///
    /// Resolution happens exactly once per run so every chunk of one pass
    /// queries the same calendar day, even when the pass crosses midnight.
    pub fn resolve(&self, today: NaiveDate) -> Result<LedgerQuery> {
        match self {
            Self::Window { days_back } => today
                .checked_sub_days(Days::new(u64::from(*days_back)))
                .map(LedgerQuery::InsertedOn)
                .ok_or_else(|| {
                    SyncError::Extraction(format!("window of {days_back} days leaves the calendar"))
                }),
            Self::Contracts(ids) => Ok(LedgerQuery::Contracts(ids.clone())),
        }
    }
}

/// An [`ExtractionFilter`] pinned to concrete values, as executed against
/// the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerQuery {
    /// Rows whose insertion date equals this calendar day
    InsertedOn(NaiveDate),
    /// An explicit list of contract identifiers
    Contracts(Vec<i64>),
}

/// Per-run delivery accounting, owned exclusively by the run coordinator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
}

impl OutcomeTally {
    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.attempted += 1;
        self.failed += 1;
    }
}

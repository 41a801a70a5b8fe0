//! Run coordinator for one full synchronization pass.
//!
//! Drives authenticate → extract+classify → aggregate → per-contract
//! reconcile/deliver, tallying outcomes. Contracts are isolated from each
//! other: a failed delivery is logged and counted, then the run moves on.
//! Token acquisition and store failures abort the whole run.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use finsync_domain::constants::{DUE_DATE_FORMAT, SENTINEL_ENTRY_KEY};
use finsync_domain::{
    ContractGroup, ExtractionFilter, OutcomeTally, ReconciliationResult, Result,
};
use tracing::{info, warn};

use crate::aggregate::group_by_contract;
use crate::classification::Classifier;
use crate::extract::Extractor;
use crate::ports::{EntryDirectory, PaymentLedger, UpsertGateway};

/// One-pass synchronization coordinator.
pub struct SyncPipeline {
    ledger: Arc<dyn PaymentLedger>,
    extractor: Extractor,
    directory: Arc<dyn EntryDirectory>,
    gateway: Arc<dyn UpsertGateway>,
}

impl SyncPipeline {
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        classifier: Classifier,
        chunk_size: u32,
        directory: Arc<dyn EntryDirectory>,
        gateway: Arc<dyn UpsertGateway>,
    ) -> Self {
        let extractor = Extractor::new(Arc::clone(&ledger), classifier, chunk_size);
        Self { ledger, extractor, directory, gateway }
    }

    /// Run one full pass using the local calendar date for fallback due
    /// dates.
    pub async fn run(&self, filter: ExtractionFilter) -> Result<OutcomeTally> {
        self.run_with_date(filter, Local::now().date_naive()).await
    }

    /// Run one full pass with an explicit run date (injectable for tests).
    ///
    /// The date drives both window resolution and the fallback due date.
    pub async fn run_with_date(
        &self,
        filter: ExtractionFilter,
        run_date: NaiveDate,
    ) -> Result<OutcomeTally> {
        // Fatal preconditions: a credential and a reachable store.
        self.gateway.preflight().await?;
        self.ledger.health_check().await?;

        // Pin the window to one calendar day for the whole pass; a run
        // crossing midnight keeps reading the day it started with.
        let query = filter.resolve(run_date)?;
        let groups = group_by_contract(self.extractor.stream(query)).await?;
        info!(contracts = groups.len(), "extraction and aggregation complete");

        let mut tally = OutcomeTally::default();
        for group in &groups {
            self.process_contract(group, run_date, &mut tally).await;
        }

        info!(
            attempted = tally.attempted,
            succeeded = tally.succeeded,
            failed = tally.failed,
            "synchronization run complete"
        );
        Ok(tally)
    }

    /// Reconcile and deliver a single contract, recording the outcome.
    ///
    /// Never returns an error: both lookup and delivery failures stay
    /// inside the per-contract boundary.
    async fn process_contract(
        &self,
        group: &ContractGroup,
        run_date: NaiveDate,
        tally: &mut OutcomeTally,
    ) {
        let reconciliation = match self.directory.find_earliest_entry(&group.contract_id).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    contract_id = %group.contract_id,
                    error = %err,
                    "reconciliation lookup failed; falling back to defaults"
                );
                ReconciliationResult::absent()
            }
        };

        let (entry_key, due_date) = prepare_delivery(&reconciliation, run_date);

        match self
            .gateway
            .deliver(&group.contract_id, &entry_key, &due_date, &group.items)
            .await
        {
            Ok(()) => {
                info!(
                    contract_id = %group.contract_id,
                    items = group.items.len(),
                    entry_key = %entry_key,
                    "contract delivered"
                );
                tally.record_success();
            }
            Err(err) => {
                warn!(
                    contract_id = %group.contract_id,
                    error = %err,
                    "contract delivery failed"
                );
                tally.record_failure();
            }
        }
    }
}

/// Resolve the reconciliation result into concrete delivery inputs.
///
/// An absent match is the expected first-time-contract case: the sentinel
/// entry key and the run's current date stand in.
pub fn prepare_delivery(
    reconciliation: &ReconciliationResult,
    run_date: NaiveDate,
) -> (String, String) {
    let entry_key = reconciliation
        .entry_key
        .clone()
        .unwrap_or_else(|| SENTINEL_ENTRY_KEY.to_string());
    let due_date = reconciliation
        .due_date
        .clone()
        .unwrap_or_else(|| run_date.format(DUE_DATE_FORMAT).to_string());
    (entry_key, due_date)
}

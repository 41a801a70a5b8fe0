//! Chunked streaming extraction from the source ledger.
//!
//! Rows are pulled in fixed-size chunks so a large window never
//! materializes in memory at once, and each row is classified the moment
//! it is read. The resulting stream is finite, single-pass and not
//! restartable; re-invoking re-executes the underlying query.

use std::collections::VecDeque;
use std::sync::Arc;

use finsync_domain::{ClassifiedItem, ClassifiedRow, LedgerQuery, RawPaymentRow, SyncError};
use futures::stream::Stream;
use tracing::debug;

use crate::classification::Classifier;
use crate::ports::PaymentLedger;

/// Streams classified rows out of a [`PaymentLedger`].
pub struct Extractor {
    ledger: Arc<dyn PaymentLedger>,
    classifier: Classifier,
    chunk_size: u32,
}

struct ChunkState {
    buffer: VecDeque<RawPaymentRow>,
    offset: u64,
    loaded: u64,
    exhausted: bool,
}

impl Extractor {
    pub fn new(ledger: Arc<dyn PaymentLedger>, classifier: Classifier, chunk_size: u32) -> Self {
        Self { ledger, classifier, chunk_size: chunk_size.max(1) }
    }

    /// Lazily yield every matching row, classified.
    ///
    /// The query is already pinned to concrete values, so every chunk of
    /// one pass reads the same slice of the ledger. A store error aborts
    /// the stream with [`SyncError::Extraction`]; rows consumed up to that
    /// point must be discarded by the caller.
    pub fn stream(
        &self,
        query: LedgerQuery,
    ) -> impl Stream<Item = Result<ClassifiedRow, SyncError>> + '_ {
        let state = ChunkState { buffer: VecDeque::new(), offset: 0, loaded: 0, exhausted: false };

        futures::stream::try_unfold(state, move |mut state| {
            let query = query.clone();
            async move {
                loop {
                    if let Some(row) = state.buffer.pop_front() {
                        return Ok(Some((self.classify_row(row), state)));
                    }
                    if state.exhausted {
                        return Ok(None);
                    }

                    let chunk = self
                        .ledger
                        .fetch_chunk(&query, state.offset, self.chunk_size)
                        .await
                        .map_err(as_extraction_error)?;

                    state.exhausted = (chunk.len() as u32) < self.chunk_size;
                    state.offset += chunk.len() as u64;
                    state.loaded += chunk.len() as u64;
                    if !chunk.is_empty() {
                        debug!(loaded = state.loaded, "extraction chunk loaded");
                    }
                    state.buffer.extend(chunk);

                    if state.buffer.is_empty() && state.exhausted {
                        return Ok(None);
                    }
                }
            }
        })
    }

    fn classify_row(&self, row: RawPaymentRow) -> ClassifiedRow {
        let classification = self.classifier.classify(row.method_code, &row.method_description);
        ClassifiedRow {
            contract_id: row.contract_id,
            item_index: row.item_index,
            item: ClassifiedItem {
                payment_type_code: classification.target_code,
                installments: classification.installments,
                term_days: classification.term_days,
                amount: format!("{:.2}", row.amount),
                due_date: None,
            },
        }
    }
}

/// Store failures mid-read surface as extraction errors; a connection-level
/// failure keeps its own kind so the coordinator reports it precisely.
fn as_extraction_error(err: SyncError) -> SyncError {
    match err {
        SyncError::Connection(_) | SyncError::Extraction(_) => err,
        other => SyncError::Extraction(other.to_string()),
    }
}

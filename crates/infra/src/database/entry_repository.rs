//! SQLite implementation of the target-entry directory port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use finsync_core::EntryDirectory;
use finsync_domain::constants::DUE_DATE_FORMAT;
use finsync_domain::{ReconciliationResult, Result, SyncError};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

use super::manager::StoreManager;

/// Schema applied by [`StoreManager::run_migrations`] for the target store.
pub const ENTRIES_SCHEMA_SQL: &str = include_str!("entries_schema.sql");

const EARLIEST_ENTRY_SQL: &str = "SELECT entry_key, due_date FROM financial_entries \
                                  WHERE contract_id = ?1 ORDER BY entry_key ASC LIMIT 1";

/// SQLite-backed entry directory.
pub struct SqliteEntryDirectory {
    db: Arc<StoreManager>,
}

impl SqliteEntryDirectory {
    pub fn new(db: Arc<StoreManager>) -> Self {
        Self { db }
    }

    fn lookup(conn: &Connection, contract_id: &str) -> Result<ReconciliationResult> {
        let row = conn
            .query_row(EARLIEST_ENTRY_SQL, params![contract_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .optional()
            .map_err(|err| {
                SyncError::ReconciliationLookup(format!("entry lookup failed: {err}"))
            })?;

        match row {
            None => Ok(ReconciliationResult::absent()),
            Some((entry_key, due_raw)) => {
                let due_date = reformat_due_date(&due_raw)?;
                Ok(ReconciliationResult {
                    entry_key: Some(entry_key.to_string()),
                    due_date: Some(due_date),
                })
            }
        }
    }
}

/// Stored dates are ISO `YYYY-MM-DD`; the gateway wants `DD/MM/YYYY`.
fn reformat_due_date(raw: &str) -> Result<String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.format(DUE_DATE_FORMAT).to_string())
        .map_err(|err| {
            SyncError::ReconciliationLookup(format!("unparseable due date {raw:?}: {err}"))
        })
}

#[async_trait]
impl EntryDirectory for SqliteEntryDirectory {
    async fn find_earliest_entry(&self, contract_id: &str) -> Result<ReconciliationResult> {
        let db = Arc::clone(&self.db);
        let contract_id = contract_id.to_string();

        task::spawn_blocking(move || -> Result<ReconciliationResult> {
            let conn = db.get_connection().map_err(|err| {
                SyncError::ReconciliationLookup(format!("entry store unavailable: {err}"))
            })?;
            Self::lookup(&conn, &contract_id)
        })
        .await
        .map_err(|err| SyncError::Internal(format!("entry lookup task failed: {err}")))?
    }
}

//! SQLite implementation of the source-ledger port.
//!
//! Row order is contract identifier then item index, which the downstream
//! aggregator relies on. The query arrives pinned to concrete values (the
//! coordinator resolves any relative window up front), so the repository
//! only binds what it is given. Reads run on the blocking pool; the
//! rusqlite connection never touches an async task directly.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finsync_core::PaymentLedger;
use finsync_domain::{LedgerQuery, RawPaymentRow, Result, SyncError};
use rusqlite::{Connection, Row, ToSql};
use tokio::task;

use super::manager::StoreManager;

/// Schema applied by [`StoreManager::run_migrations`] for the source store.
pub const LEDGER_SCHEMA_SQL: &str = include_str!("ledger_schema.sql");

const SELECT_COLUMNS: &str = "SELECT contract_id, item_index, method_code, method_description, \
                              amount, inserted_at FROM contract_payments";

/// SQLite-backed payment ledger.
pub struct SqliteLedgerRepository {
    db: Arc<StoreManager>,
}

impl SqliteLedgerRepository {
    pub fn new(db: Arc<StoreManager>) -> Self {
        Self { db }
    }

    fn query_chunk(
        conn: &Connection,
        query: &LedgerQuery,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RawPaymentRow>> {
        let limit = i64::from(limit);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let (sql, params) = match query {
            LedgerQuery::InsertedOn(day) => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE date(inserted_at) = ?1 \
                     ORDER BY contract_id, item_index LIMIT ?2 OFFSET ?3"
                );
                let params: Vec<Box<dyn ToSql>> = vec![
                    Box::new(day.format("%Y-%m-%d").to_string()),
                    Box::new(limit),
                    Box::new(offset),
                ];
                (sql, params)
            }
            LedgerQuery::Contracts(ids) => {
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                let placeholders =
                    (1..=ids.len()).map(|n| format!("?{n}")).collect::<Vec<_>>().join(", ");
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE contract_id IN ({placeholders}) \
                     ORDER BY contract_id, item_index LIMIT ?{} OFFSET ?{}",
                    ids.len() + 1,
                    ids.len() + 2
                );
                let mut params: Vec<Box<dyn ToSql>> =
                    ids.iter().map(|id| Box::new(id.to_string()) as Box<dyn ToSql>).collect();
                params.push(Box::new(limit));
                params.push(Box::new(offset));
                (sql, params)
            }
        };

        let mut stmt = conn.prepare(&sql).map_err(map_query_error)?;
        let param_refs: Vec<&dyn ToSql> = params.iter().map(AsRef::as_ref).collect();
        let rows = stmt
            .query_map(param_refs.as_slice(), map_payment_row)
            .map_err(map_query_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_query_error)?;

        Ok(rows)
    }
}

#[async_trait]
impl PaymentLedger for SqliteLedgerRepository {
    async fn fetch_chunk(
        &self,
        query: &LedgerQuery,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<RawPaymentRow>> {
        let db = Arc::clone(&self.db);
        let query = query.clone();

        task::spawn_blocking(move || -> Result<Vec<RawPaymentRow>> {
            let conn = db.get_connection()?;
            Self::query_chunk(&conn, &query, offset, limit)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn health_check(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || db.health_check()).await.map_err(map_join_error)?
    }
}

fn map_payment_row(row: &Row<'_>) -> rusqlite::Result<RawPaymentRow> {
    let inserted_raw: String = row.get(5)?;
    let inserted_at = parse_timestamp(&inserted_raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(RawPaymentRow {
        contract_id: row.get(0)?,
        item_index: row.get(1)?,
        method_code: row.get(2)?,
        method_description: row.get(3)?,
        amount: row.get(4)?,
        inserted_at,
    })
}

fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

fn map_query_error(err: rusqlite::Error) -> SyncError {
    SyncError::Extraction(format!("ledger query failed: {err}"))
}

fn map_join_error(err: task::JoinError) -> SyncError {
    SyncError::Internal(format!("ledger task failed: {err}"))
}

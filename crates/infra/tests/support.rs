//! Shared fixtures for infra integration tests.

use std::sync::Arc;

use finsync_domain::StoreConfig;
use finsync_infra::database::{ENTRIES_SCHEMA_SQL, LEDGER_SCHEMA_SQL};
use finsync_infra::StoreManager;
use tempfile::TempDir;

/// Temporary store wrapper that keeps the underlying file alive for the
/// duration of a test.
pub struct TestStore {
    pub manager: Arc<StoreManager>,
    _temp_dir: TempDir,
}

impl TestStore {
    fn open(file_name: &str, schema: &str) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join(file_name);
        let config =
            StoreConfig { path: db_path.to_string_lossy().into_owned(), pool_size: 4 };

        let manager = StoreManager::open(&config).expect("store manager should open");
        manager.run_migrations(schema).expect("schema should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// A fresh source ledger store with the payment schema applied.
    pub fn ledger() -> Self {
        Self::open("source.db", LEDGER_SCHEMA_SQL)
    }

    /// A fresh target store with the financial-entry schema applied.
    pub fn entries() -> Self {
        Self::open("target.db", ENTRIES_SCHEMA_SQL)
    }

    /// Execute a batch of SQL statements against the store.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.execute_batch(sql).expect("SQL batch should succeed");
    }
}

/// Insert one payment row into a ledger store.
pub fn insert_payment(
    store: &TestStore,
    contract_id: &str,
    item_index: i64,
    method_code: i64,
    description: &str,
    amount: f64,
    inserted_at: &str,
) {
    let conn = store.manager.get_connection().expect("connection should be available");
    conn.execute(
        "INSERT INTO contract_payments \
         (contract_id, item_index, method_code, method_description, amount, inserted_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![contract_id, item_index, method_code, description, amount, inserted_at],
    )
    .expect("payment row should insert");
}

/// Insert one financial entry into a target store.
pub fn insert_entry(store: &TestStore, entry_key: i64, contract_id: &str, due_date: &str) {
    let conn = store.manager.get_connection().expect("connection should be available");
    conn.execute(
        "INSERT INTO financial_entries (entry_key, contract_id, due_date) VALUES (?1, ?2, ?3)",
        rusqlite::params![entry_key, contract_id, due_date],
    )
    .expect("financial entry should insert");
}

/// RFC 3339 timestamp during the given calendar day.
pub fn timestamp_on(day: chrono::NaiveDate) -> String {
    format!("{}T10:30:00Z", day.format("%Y-%m-%d"))
}

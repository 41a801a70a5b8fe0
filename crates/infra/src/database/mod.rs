//! SQLite-backed implementations of the store ports.

pub mod entry_repository;
pub mod ledger_repository;
pub mod manager;

pub use entry_repository::{SqliteEntryDirectory, ENTRIES_SCHEMA_SQL};
pub use ledger_repository::{SqliteLedgerRepository, LEDGER_SCHEMA_SQL};
pub use manager::StoreManager;

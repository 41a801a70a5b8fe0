//! # Finsync Infrastructure
//!
//! Infrastructure implementations of core pipeline ports.
//!
//! This crate contains:
//! - Store implementations (SQLite ledger and entry directory)
//! - The gateway HTTP client and credential cache
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `finsync-core`
//! - Contains all "impure" code (I/O, HTTP, environment)

pub mod config;
pub mod database;
pub mod errors;
pub mod gateway;
pub mod http;

pub use database::{SqliteEntryDirectory, SqliteLedgerRepository, StoreManager};
pub use errors::InfraError;
pub use gateway::{CredentialCache, GatewayClient};
pub use http::HttpClient;

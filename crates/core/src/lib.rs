//! # Finsync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The classification engine and its rule tables
//! - The chunked streaming extractor and contract aggregator
//! - The run coordinator driving one full synchronization pass
//! - Port/adapter interfaces (traits) implemented by `finsync-infra`
//!
//! ## Architecture Principles
//! - Only depends on `finsync-domain`
//! - No database or HTTP code
//! - All external collaborators via traits
//! - Pure, testable business logic

pub mod aggregate;
pub mod classification;
pub mod extract;
pub mod pipeline;

// Infrastructure ports
pub mod ports;

// Re-export specific items to avoid ambiguity
pub use aggregate::group_by_contract;
pub use classification::{Classification, Classifier, RuleTable};
pub use extract::Extractor;
pub use pipeline::{prepare_delivery, SyncPipeline};
pub use ports::{AccessTokenProvider, EntryDirectory, PaymentLedger, UpsertGateway};

//! # Finsync Domain
//!
//! Business domain types and models for the installment sync pipeline.
//!
//! This crate contains:
//! - Pipeline data types (payment rows, classified items, contract groups)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other finsync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;

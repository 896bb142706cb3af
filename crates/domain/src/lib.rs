//! # Costledger Domain
//!
//! Business domain types for the construction cost ledger.
//!
//! This crate contains:
//! - Value types (companies, contracts, cost nodes, invoices, lines)
//! - Domain error type and Result definition
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other costledger crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;

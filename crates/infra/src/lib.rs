//! # Costledger Infrastructure
//!
//! Infrastructure implementations of the core repository ports.
//!
//! This crate contains:
//! - SQLite repositories on an r2d2 connection pool
//! - An in-memory store implementing every port
//! - Configuration loading (environment, JSON, TOML)
//! - Tracing subscriber setup
//! - `LedgerContext`, which wires a backend into the core services
//!
//! ## Architecture
//! - Implements traits defined in `costledger-core`
//! - Contains all "impure" code (I/O, database, process environment)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod memory;
pub mod observability;

pub use context::{LedgerContext, LedgerRepositories};
pub use database::*;
pub use errors::{map_sql_error, InfraError};
pub use memory::MemoryLedgerStore;
pub use observability::init_tracing;

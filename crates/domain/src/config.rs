//! Configuration structures
//!
//! Plain data loaded by `costledger-infra::config`; defaults describe a local
//! SQLite ledger.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ARBITER_MIN_CONFIDENCE, FULL_UPDATE_THRESHOLD};
use crate::impl_domain_status_conversions;

/// Top-level ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LedgerConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "costledger.db".to_string(), pool_size: 4 }
    }
}

/// Which repository implementation backs the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl_domain_status_conversions!(StorageBackend {
    Sqlite => "sqlite",
    Memory => "memory",
});

/// Company resolution tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Overall input score at which a matched company is fully overwritten.
    pub full_update_threshold: u8,
    /// Confidence floor passed to the owner arbiter.
    pub arbiter_min_confidence: f64,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            full_update_threshold: FULL_UPDATE_THRESHOLD,
            arbiter_min_confidence: DEFAULT_ARBITER_MIN_CONFIDENCE,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

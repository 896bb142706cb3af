//! Configuration loader
//!
//! Loads ledger configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `COSTLEDGER_DB_PATH` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. JSON and TOML are detected by file extension
//!
//! ## Environment Variables
//! - `COSTLEDGER_DB_PATH`: Database file path (required)
//! - `COSTLEDGER_DB_POOL_SIZE`: Connection pool size
//! - `COSTLEDGER_STORAGE`: `sqlite` or `memory`
//! - `COSTLEDGER_FULL_UPDATE_THRESHOLD`: Score (0-100) that triggers a full
//!   company update
//! - `COSTLEDGER_ARBITER_MIN_CONFIDENCE`: Confidence floor for the owner arbiter
//! - `COSTLEDGER_LOG_LEVEL`: Default tracing filter
//! - `COSTLEDGER_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! `config.{json,toml}` and `costledger.{json,toml}` in the working directory,
//! its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use costledger_domain::{
    DatabaseConfig, LedgerConfig, LedgerError, LoggingConfig, ResolutionConfig, Result,
    StorageBackend,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "costledger.json", "costledger.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `LedgerError::Config` if neither source yields a valid config.
pub fn load() -> Result<LedgerConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only the database path is required; unset variables keep their defaults.
///
/// # Errors
/// Returns `LedgerError::Config` if the path is missing or a value does not
/// parse.
pub fn load_from_env() -> Result<LedgerConfig> {
    let defaults = LedgerConfig::default();

    let path = env_var("COSTLEDGER_DB_PATH")?;
    let pool_size = env_parse("COSTLEDGER_DB_POOL_SIZE", defaults.database.pool_size)?;
    let storage = match std::env::var("COSTLEDGER_STORAGE") {
        Ok(raw) => raw.parse::<StorageBackend>().map_err(LedgerError::Config)?,
        Err(_) => defaults.storage,
    };

    let full_update_threshold = env_parse(
        "COSTLEDGER_FULL_UPDATE_THRESHOLD",
        defaults.resolution.full_update_threshold,
    )?;
    let arbiter_min_confidence = env_parse(
        "COSTLEDGER_ARBITER_MIN_CONFIDENCE",
        defaults.resolution.arbiter_min_confidence,
    )?;

    let level = std::env::var("COSTLEDGER_LOG_LEVEL").unwrap_or(defaults.logging.level);
    let json = env_bool("COSTLEDGER_LOG_JSON", defaults.logging.json);

    let config = LedgerConfig {
        database: DatabaseConfig { path, pool_size },
        storage,
        resolution: ResolutionConfig { full_update_threshold, arbiter_min_confidence },
        logging: LoggingConfig { level, json },
    };
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `LedgerError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<LedgerConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LedgerError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LedgerError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LedgerError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<LedgerConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| LedgerError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LedgerError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(LedgerError::Config(format!("Unsupported config format: {}", extension))),
    }
}

fn validate(config: &LedgerConfig) -> Result<()> {
    if config.database.pool_size == 0 {
        return Err(LedgerError::Config("Pool size must be at least 1".into()));
    }
    if config.resolution.full_update_threshold > 100 {
        return Err(LedgerError::Config(format!(
            "Full update threshold must be within 0-100, got {}",
            config.resolution.full_update_threshold
        )));
    }
    if !(0.0..=1.0).contains(&config.resolution.arbiter_min_confidence) {
        return Err(LedgerError::Config(format!(
            "Arbiter confidence must be within 0.0-1.0, got {}",
            config.resolution.arbiter_min_confidence
        )));
    }
    Ok(())
}

/// First existing config file in the standard locations, if any.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join("..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        LedgerError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse an optional variable, keeping `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| LedgerError::Config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

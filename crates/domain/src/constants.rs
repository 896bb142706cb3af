//! Domain constants
//!
//! Centralized location for literals shared by the builders, validators and
//! resolution services.

// Cost node tree
pub const ROOT_CODE: &str = "ROOT";
pub const DEFAULT_ROOT_NAME: &str = "Contract root";
pub const MAX_COST_NODE_DEPTH: usize = 64;

// Company resolution
pub const FULL_UPDATE_THRESHOLD: u8 = 85;
pub const PLACEHOLDER_TAX_PREFIX: &str = "TMP-";
pub const UNKNOWN_COMPANY_NAME: &str = "UNKNOWN SELLER";
pub const DEFAULT_ARBITER_MIN_CONFIDENCE: f64 = 0.8;
pub const MIN_NAME_QUERY_LENGTH: usize = 3;

// Money
pub const MONEY_SCALE: i64 = 2;

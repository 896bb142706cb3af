//! Infrastructure error conversions

mod conversions;

pub use conversions::{map_sql_error, InfraError};

//! Conversions from external infrastructure errors into domain errors.

use costledger_domain::LedgerError;
use r2d2::Error as PoolError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LedgerError);

impl From<InfraError> for LedgerError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LedgerError> for InfraError {
    fn from(value: LedgerError) -> Self {
        InfraError(value)
    }
}

trait IntoLedgerError {
    fn into_ledger(self) -> LedgerError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LedgerError */
/* -------------------------------------------------------------------------- */

impl IntoLedgerError for SqlError {
    fn into_ledger(self) -> LedgerError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => LedgerError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        LedgerError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        LedgerError::Conflict(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => LedgerError::Database(format!(
                        "foreign key constraint violation: {message}"
                    )),
                    _ => LedgerError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LedgerError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LedgerError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                LedgerError::Database(format!("invalid column type for '{name}': {ty}"))
            }
            RE::InvalidQuery => LedgerError::Database("invalid SQL query".into()),
            other => LedgerError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_ledger())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LedgerError */
/* -------------------------------------------------------------------------- */

impl IntoLedgerError for PoolError {
    fn into_ledger(self) -> LedgerError {
        LedgerError::Database(format!("connection pool error: {self}"))
    }
}

impl From<PoolError> for InfraError {
    fn from(value: PoolError) -> Self {
        InfraError(value.into_ledger())
    }
}

/// Map a rusqlite error straight into the domain error.
pub fn map_sql_error(err: SqlError) -> LedgerError {
    LedgerError::from(InfraError::from(err))
}

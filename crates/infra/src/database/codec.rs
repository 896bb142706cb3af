//! Column codecs shared by the SQLite repositories.
//!
//! Ids are stored as UUID text, decimals as their canonical string and enums
//! through their `Display` / `FromStr` spelling.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use costledger_domain::{LedgerError, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, Params, Row};
use uuid::Uuid;

use crate::errors::map_sql_error;

fn conversion_error(
    idx: usize,
    cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, cause.into())
}

pub(crate) fn read_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|err| conversion_error(idx, err))
}

pub(crate) fn read_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| Uuid::parse_str(&raw).map_err(|err| conversion_error(idx, err))).transpose()
}

pub(crate) fn read_decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<BigDecimal> {
    let raw: String = row.get(idx)?;
    BigDecimal::from_str(&raw).map_err(|err| conversion_error(idx, err))
}

pub(crate) fn read_opt_decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<BigDecimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| BigDecimal::from_str(&raw).map_err(|err| conversion_error(idx, err)))
        .transpose()
}

/// Parse an enum written with its `Display` spelling.
pub(crate) fn read_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|err| conversion_error(idx, err))
}

pub(crate) fn read_opt_enum<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| raw.parse::<T>().map_err(|err| conversion_error(idx, err))).transpose()
}

pub(crate) fn opt_id(id: Option<Uuid>) -> Option<String> {
    id.map(|id| id.to_string())
}

pub(crate) fn opt_decimal(value: Option<&BigDecimal>) -> Option<String> {
    value.map(ToString::to_string)
}

/// `?, ?, ...` placeholder list for an `IN (...)` clause.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Run `sql` and map every row.
pub(crate) fn query_rows<T>(
    conn: &Connection,
    sql: &str,
    params: impl Params,
    map_row: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map(params, map_row).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

/// Map an `UPDATE` that touched no row to [`LedgerError::NotFound`].
pub(crate) fn ensure_changed(changed: usize, id: Uuid) -> Result<()> {
    if changed == 0 {
        return Err(LedgerError::not_found(format!("no entity with id {id}")));
    }
    Ok(())
}

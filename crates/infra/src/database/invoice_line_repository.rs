//! SQLite implementation of the `InvoiceLineRepository` port.

use std::collections::BTreeSet;
use std::sync::Arc;

use costledger_core::InvoiceLineRepository;
use costledger_domain::{Amount, InvoiceLine, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::codec::{
    ensure_changed, opt_decimal, opt_id, placeholders, query_rows, read_decimal, read_enum,
    read_opt_decimal, read_opt_uuid, read_uuid,
};
use super::manager::DbManager;
use crate::errors::map_sql_error;

const LINE_SELECT: &str = "SELECT id, invoice_id, contract_id, cost_node_id, cost_type_id, \
     item_name, description, quantity, unit, value, vat_rate, tax_treatment FROM invoice_lines";

const LINE_INSERT_SQL: &str = "INSERT INTO invoice_lines (id, invoice_id, contract_id, \
     cost_node_id, cost_type_id, item_name, description, quantity, unit, value, vat_rate, \
     tax_treatment) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

const LINE_UPDATE_SQL: &str = "UPDATE invoice_lines SET invoice_id = ?2, contract_id = ?3, \
     cost_node_id = ?4, cost_type_id = ?5, item_name = ?6, description = ?7, quantity = ?8, \
     unit = ?9, value = ?10, vat_rate = ?11, tax_treatment = ?12 WHERE id = ?1";

pub struct SqliteInvoiceLineRepository {
    db: Arc<DbManager>,
}

impl SqliteInvoiceLineRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn write(&self, sql: &str, line: &InvoiceLine) -> Result<usize> {
        let conn = self.db.get_connection()?;
        conn.execute(
            sql,
            params![
                line.id.to_string(),
                opt_id(line.invoice_id),
                opt_id(line.contract_id),
                opt_id(line.cost_node_id),
                opt_id(line.cost_type_id),
                line.item_name,
                line.description,
                opt_decimal(line.quantity.as_ref()),
                line.unit.as_str(),
                line.amount.value.to_string(),
                line.amount.vat_rate.as_str(),
                line.amount.tax_treatment.as_str(),
            ],
        )
        .map_err(map_sql_error)
    }
}

impl InvoiceLineRepository for SqliteInvoiceLineRepository {
    fn add(&self, line: &InvoiceLine) -> Result<()> {
        self.write(LINE_INSERT_SQL, line)?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<InvoiceLine>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("{LINE_SELECT} WHERE id = ?1"),
            params![id.to_string()],
            map_invoice_line_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn update(&self, line: &InvoiceLine) -> Result<()> {
        let changed = self.write(LINE_UPDATE_SQL, line)?;
        ensure_changed(changed, line.id)
    }

    fn list_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<InvoiceLine>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!("{LINE_SELECT} WHERE invoice_id = ?1 ORDER BY rowid"),
            params![invoice_id.to_string()],
            map_invoice_line_row,
        )
    }

    fn list_by_invoice_ids(&self, invoice_ids: &[Uuid]) -> Result<Vec<InvoiceLine>> {
        if invoice_ids.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.db.get_connection()?;
        let sql = format!(
            "{LINE_SELECT} WHERE invoice_id IN ({}) ORDER BY rowid",
            placeholders(invoice_ids.len())
        );
        query_rows(
            &conn,
            &sql,
            params_from_iter(invoice_ids.iter().map(Uuid::to_string)),
            map_invoice_line_row,
        )
    }

    fn list_by_null_invoice(&self) -> Result<Vec<InvoiceLine>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!("{LINE_SELECT} WHERE invoice_id IS NULL ORDER BY rowid"),
            [],
            map_invoice_line_row,
        )
    }

    fn get_for_assignment(&self) -> Result<Vec<InvoiceLine>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!(
                "{LINE_SELECT} WHERE contract_id IS NULL OR cost_node_id IS NULL \
                 OR cost_type_id IS NULL ORDER BY rowid"
            ),
            [],
            map_invoice_line_row,
        )
    }

    fn delete_not_in_ids(&self, invoice_id: Uuid, keep_ids: &BTreeSet<Uuid>) -> Result<usize> {
        let conn = self.db.get_connection()?;
        let mut values = vec![Value::Text(invoice_id.to_string())];
        let sql = if keep_ids.is_empty() {
            "DELETE FROM invoice_lines WHERE invoice_id = ?".to_string()
        } else {
            values.extend(keep_ids.iter().map(|id| Value::Text(id.to_string())));
            format!(
                "DELETE FROM invoice_lines WHERE invoice_id = ? AND id NOT IN ({})",
                placeholders(keep_ids.len())
            )
        };

        let deleted = conn.execute(&sql, params_from_iter(values)).map_err(map_sql_error)?;
        debug!(%invoice_id, deleted, kept = keep_ids.len(), "Synced invoice lines");
        Ok(deleted)
    }
}

fn map_invoice_line_row(row: &Row<'_>) -> rusqlite::Result<InvoiceLine> {
    Ok(InvoiceLine {
        id: read_uuid(row, 0)?,
        invoice_id: read_opt_uuid(row, 1)?,
        contract_id: read_opt_uuid(row, 2)?,
        cost_node_id: read_opt_uuid(row, 3)?,
        cost_type_id: read_opt_uuid(row, 4)?,
        item_name: row.get(5)?,
        description: row.get(6)?,
        quantity: read_opt_decimal(row, 7)?,
        unit: read_enum(row, 8)?,
        amount: Amount {
            value: read_decimal(row, 9)?,
            vat_rate: read_enum(row, 10)?,
            tax_treatment: read_enum(row, 11)?,
        },
    })
}

//! SQLite implementation of the `InvoiceRepository` port.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use costledger_core::InvoiceRepository;
use costledger_domain::{Invoice, InvoiceStatus, Result};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::codec::{ensure_changed, placeholders, query_rows, read_enum, read_uuid};
use super::manager::DbManager;
use crate::errors::map_sql_error;

const INVOICE_SELECT: &str = "SELECT id, invoice_number, invoice_date, selling_date, buyer_id, \
     seller_id, payment_method, due_date, payment_status, status, timestamp FROM invoices";

const INVOICE_INSERT_SQL: &str = "INSERT INTO invoices (id, invoice_number, invoice_date, \
     selling_date, buyer_id, seller_id, payment_method, due_date, payment_status, status, \
     timestamp) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const INVOICE_UPDATE_SQL: &str = "UPDATE invoices SET invoice_number = ?2, invoice_date = ?3, \
     selling_date = ?4, buyer_id = ?5, seller_id = ?6, payment_method = ?7, due_date = ?8, \
     payment_status = ?9, status = ?10, timestamp = ?11 WHERE id = ?1";

pub struct SqliteInvoiceRepository {
    db: Arc<DbManager>,
}

impl SqliteInvoiceRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn write(&self, sql: &str, invoice: &Invoice) -> Result<usize> {
        let conn = self.db.get_connection()?;
        conn.execute(
            sql,
            params![
                invoice.id.to_string(),
                invoice.invoice_number,
                invoice.invoice_date,
                invoice.selling_date,
                invoice.buyer_id.to_string(),
                invoice.seller_id.to_string(),
                invoice.payment_method.as_str(),
                invoice.due_date,
                invoice.payment_status.as_str(),
                invoice.status.as_str(),
                invoice.timestamp,
            ],
        )
        .map_err(map_sql_error)
    }
}

impl InvoiceRepository for SqliteInvoiceRepository {
    fn add(&self, invoice: &Invoice) -> Result<()> {
        self.write(INVOICE_INSERT_SQL, invoice)?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Invoice>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("{INVOICE_SELECT} WHERE id = ?1"),
            params![id.to_string()],
            map_invoice_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn list(&self) -> Result<Vec<Invoice>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!("{INVOICE_SELECT} ORDER BY invoice_date, invoice_number"),
            [],
            map_invoice_row,
        )
    }

    fn update(&self, invoice: &Invoice) -> Result<()> {
        let changed = self.write(INVOICE_UPDATE_SQL, invoice)?;
        ensure_changed(changed, invoice.id)
    }

    fn get_unique_invoice(&self, invoice_number: &str, seller_id: Uuid) -> Result<Option<Invoice>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("{INVOICE_SELECT} WHERE invoice_number = ?1 AND seller_id = ?2"),
            params![invoice_number, seller_id.to_string()],
            map_invoice_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn get_for_assignment(&self, statuses: &[InvoiceStatus]) -> Result<Vec<Invoice>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.db.get_connection()?;
        let sql = format!(
            "{INVOICE_SELECT} WHERE status IN ({}) ORDER BY invoice_date, invoice_number",
            placeholders(statuses.len())
        );
        query_rows(
            &conn,
            &sql,
            params_from_iter(statuses.iter().map(|status| status.as_str())),
            map_invoice_row,
        )
    }
}

fn map_invoice_row(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    let invoice_date: NaiveDate = row.get(2)?;
    let selling_date: NaiveDate = row.get(3)?;
    let due_date: NaiveDate = row.get(7)?;
    let timestamp: DateTime<Utc> = row.get(10)?;

    Ok(Invoice {
        id: read_uuid(row, 0)?,
        invoice_number: row.get(1)?,
        invoice_date,
        selling_date,
        buyer_id: read_uuid(row, 4)?,
        seller_id: read_uuid(row, 5)?,
        payment_method: read_enum(row, 6)?,
        due_date,
        payment_status: read_enum(row, 8)?,
        status: read_enum(row, 9)?,
        timestamp,
    })
}

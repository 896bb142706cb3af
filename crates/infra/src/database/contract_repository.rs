//! SQLite implementation of the `ContractRepository` port.

use std::sync::Arc;

use costledger_core::ContractRepository;
use costledger_domain::{Contract, Result};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::codec::{
    ensure_changed, opt_decimal, query_rows, read_enum, read_opt_decimal, read_uuid,
};
use super::manager::DbManager;
use crate::errors::map_sql_error;

pub struct SqliteContractRepository {
    db: Arc<DbManager>,
}

impl SqliteContractRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

impl ContractRepository for SqliteContractRepository {
    fn add(&self, contract: &Contract) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            CONTRACT_INSERT_SQL,
            params![
                contract.id.to_string(),
                contract.code,
                contract.name,
                contract.owner_id.to_string(),
                contract.client_id.to_string(),
                contract.description,
                contract.start_date,
                contract.end_date,
                opt_decimal(contract.budget.as_ref()),
                contract.path,
                contract.status.as_str(),
            ],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Contract>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("{CONTRACT_SELECT} WHERE id = ?1"),
            params![id.to_string()],
            map_contract_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn list(&self) -> Result<Vec<Contract>> {
        let conn = self.db.get_connection()?;
        query_rows(&conn, &format!("{CONTRACT_SELECT} ORDER BY code"), [], map_contract_row)
    }

    fn update(&self, contract: &Contract) -> Result<()> {
        let conn = self.db.get_connection()?;
        let changed = conn
            .execute(
                CONTRACT_UPDATE_SQL,
                params![
                    contract.id.to_string(),
                    contract.code,
                    contract.name,
                    contract.owner_id.to_string(),
                    contract.client_id.to_string(),
                    contract.description,
                    contract.start_date,
                    contract.end_date,
                    opt_decimal(contract.budget.as_ref()),
                    contract.path,
                    contract.status.as_str(),
                ],
            )
            .map_err(map_sql_error)?;
        ensure_changed(changed, contract.id)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )
        .map_err(map_sql_error)
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Contract>> {
        let conn = self.db.get_connection()?;
        conn.query_row(&format!("{CONTRACT_SELECT} WHERE code = ?1"), params![code], map_contract_row)
            .optional()
            .map_err(map_sql_error)
    }
}

const CONTRACT_SELECT: &str = "SELECT id, code, name, owner_id, client_id, description,
        start_date, end_date, budget, path, status
    FROM contracts";

const CONTRACT_INSERT_SQL: &str = "INSERT INTO contracts (
        id, code, name, owner_id, client_id, description, start_date, end_date, budget, path,
        status
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const CONTRACT_UPDATE_SQL: &str = "UPDATE contracts SET
        code = ?2, name = ?3, owner_id = ?4, client_id = ?5, description = ?6, start_date = ?7,
        end_date = ?8, budget = ?9, path = ?10, status = ?11
    WHERE id = ?1";

fn map_contract_row(row: &Row<'_>) -> rusqlite::Result<Contract> {
    Ok(Contract {
        id: read_uuid(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        owner_id: read_uuid(row, 3)?,
        client_id: read_uuid(row, 4)?,
        description: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        budget: read_opt_decimal(row, 8)?,
        path: row.get(9)?,
        status: read_enum(row, 10)?,
    })
}

//! SQLite implementation of the `CostTypeRepository` port.

use std::sync::Arc;

use costledger_core::CostTypeRepository;
use costledger_domain::{CostType, Result};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::codec::{ensure_changed, query_rows, read_uuid};
use super::manager::DbManager;
use crate::errors::map_sql_error;

pub struct SqliteCostTypeRepository {
    db: Arc<DbManager>,
}

impl SqliteCostTypeRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

impl CostTypeRepository for SqliteCostTypeRepository {
    fn add(&self, cost_type: &CostType) -> Result<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            "INSERT INTO cost_types (id, code, name, is_active) VALUES (?1, ?2, ?3, ?4)",
            params![cost_type.id.to_string(), cost_type.code, cost_type.name, cost_type.is_active],
        )
        .map_err(map_sql_error)?;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<CostType>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT id, code, name, is_active FROM cost_types WHERE id = ?1",
            params![id.to_string()],
            map_cost_type_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn get_by_code(&self, code: &str) -> Result<Option<CostType>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT id, code, name, is_active FROM cost_types WHERE code = ?1",
            params![code],
            map_cost_type_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn list(&self) -> Result<Vec<CostType>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            "SELECT id, code, name, is_active FROM cost_types ORDER BY code",
            [],
            map_cost_type_row,
        )
    }

    fn update(&self, cost_type: &CostType) -> Result<()> {
        let conn = self.db.get_connection()?;
        let changed = conn
            .execute(
                "UPDATE cost_types SET code = ?2, name = ?3, is_active = ?4 WHERE id = ?1",
                params![
                    cost_type.id.to_string(),
                    cost_type.code,
                    cost_type.name,
                    cost_type.is_active
                ],
            )
            .map_err(map_sql_error)?;
        ensure_changed(changed, cost_type.id)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM cost_types WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )
        .map_err(map_sql_error)
    }
}

fn map_cost_type_row(row: &Row<'_>) -> rusqlite::Result<CostType> {
    Ok(CostType {
        id: read_uuid(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
    })
}

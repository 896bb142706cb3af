//! SQLite implementation of the `CostNodeRepository` port.
//!
//! Multi-row writes run in one transaction; the parent reference is a
//! deferred foreign key so a subtree may be written in any order.

use std::sync::Arc;

use costledger_core::CostNodeRepository;
use costledger_domain::{ContractStatus, CostNode, Result};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

use super::codec::{
    ensure_changed, opt_decimal, opt_id, placeholders, query_rows, read_opt_decimal,
    read_opt_enum, read_opt_uuid, read_uuid,
};
use super::manager::DbManager;
use crate::errors::map_sql_error;

pub struct SqliteCostNodeRepository {
    db: Arc<DbManager>,
}

impl SqliteCostNodeRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn exists_query(&self, sql: &str, id: Uuid) -> Result<bool> {
        let conn = self.db.get_connection()?;
        conn.query_row(sql, params![id.to_string()], |row| row.get(0)).map_err(map_sql_error)
    }
}

impl CostNodeRepository for SqliteCostNodeRepository {
    fn add(&self, node: &CostNode) -> Result<()> {
        let conn = self.db.get_connection()?;
        insert_node(&conn, node)
    }

    fn add_all(&self, nodes: &[CostNode]) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        for node in nodes {
            insert_node(&tx, node)?;
        }
        tx.commit().map_err(map_sql_error)?;
        debug!(count = nodes.len(), "cost nodes inserted");
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<CostNode>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("{COST_NODE_SELECT} WHERE n.id = ?1"),
            params![id.to_string()],
            map_cost_node_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn get_by_code(&self, contract_id: Uuid, code: &str) -> Result<Option<CostNode>> {
        let conn = self.db.get_connection()?;
        conn.query_row(
            &format!("{COST_NODE_SELECT} WHERE n.contract_id = ?1 AND n.code = ?2"),
            params![contract_id.to_string(), code],
            map_cost_node_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn list_nodes(&self) -> Result<Vec<CostNode>> {
        let conn = self.db.get_connection()?;
        query_rows(&conn, &format!("{COST_NODE_SELECT} ORDER BY n.rowid"), [], map_cost_node_row)
    }

    fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<CostNode>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!("{COST_NODE_SELECT} WHERE n.parent_id = ?1 ORDER BY n.rowid"),
            params![parent_id.to_string()],
            map_cost_node_row,
        )
    }

    fn list_by_contract(&self, contract_id: Uuid) -> Result<Vec<CostNode>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!("{COST_NODE_SELECT} WHERE n.contract_id = ?1 ORDER BY n.rowid"),
            params![contract_id.to_string()],
            map_cost_node_row,
        )
    }

    fn update(&self, node: &CostNode) -> Result<()> {
        let conn = self.db.get_connection()?;
        update_node(&conn, node)
    }

    fn update_many(&self, nodes: &[CostNode]) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        for node in nodes {
            update_node(&tx, node)?;
        }
        tx.commit().map_err(map_sql_error)
    }

    fn delete_by_contract(&self, contract_id: Uuid) -> Result<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        let deleted = tx
            .execute(
                "DELETE FROM cost_nodes WHERE contract_id = ?1",
                params![contract_id.to_string()],
            )
            .map_err(map_sql_error)?;
        tx.commit().map_err(map_sql_error)?;
        debug!(contract_id = %contract_id, deleted, "contract cost nodes deleted");
        Ok(())
    }

    fn delete_many(&self, ids: &[Uuid]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(map_sql_error)?;
        tx.execute(
            &format!("DELETE FROM cost_nodes WHERE id IN ({})", placeholders(ids.len())),
            params_from_iter(ids.iter().map(Uuid::to_string)),
        )
        .map_err(map_sql_error)?;
        tx.commit().map_err(map_sql_error)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        self.exists_query("SELECT EXISTS(SELECT 1 FROM cost_nodes WHERE id = ?1)", id)
    }

    fn has_costs(&self, contract_id: Uuid) -> Result<bool> {
        self.exists_query(
            "SELECT EXISTS(SELECT 1 FROM invoice_lines WHERE contract_id = ?1)",
            contract_id,
        )
    }

    fn node_has_costs(&self, node_id: Uuid) -> Result<bool> {
        self.exists_query(
            "SELECT EXISTS(SELECT 1 FROM invoice_lines WHERE cost_node_id = ?1)",
            node_id,
        )
    }

    fn list_leaf_nodes_for_active_contracts(&self) -> Result<Vec<CostNode>> {
        let conn = self.db.get_connection()?;
        query_rows(
            &conn,
            &format!(
                "{COST_NODE_SELECT}
                JOIN contracts c ON c.id = n.contract_id
                WHERE c.status = ?1 AND n.is_active = 1
                  AND NOT EXISTS (SELECT 1 FROM cost_nodes child WHERE child.parent_id = n.id)
                ORDER BY c.code, n.code"
            ),
            params![ContractStatus::Active.as_str()],
            map_cost_node_row,
        )
    }
}

const COST_NODE_SELECT: &str = "SELECT n.id, n.contract_id, n.parent_id, n.code, n.name,
        n.budget, n.quantity, n.unit, n.is_active
    FROM cost_nodes n";

const COST_NODE_INSERT_SQL: &str = "INSERT INTO cost_nodes (
        id, contract_id, parent_id, code, name, budget, quantity, unit, is_active
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const COST_NODE_UPDATE_SQL: &str = "UPDATE cost_nodes SET
        contract_id = ?2, parent_id = ?3, code = ?4, name = ?5, budget = ?6, quantity = ?7,
        unit = ?8, is_active = ?9
    WHERE id = ?1";

fn insert_node(conn: &Connection, node: &CostNode) -> Result<()> {
    conn.execute(
        COST_NODE_INSERT_SQL,
        params![
            node.id.to_string(),
            node.contract_id.to_string(),
            opt_id(node.parent_id),
            node.code,
            node.name,
            opt_decimal(node.budget.as_ref()),
            opt_decimal(node.quantity.as_ref()),
            node.unit.map(|unit| unit.as_str()),
            node.is_active,
        ],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

fn update_node(conn: &Connection, node: &CostNode) -> Result<()> {
    let changed = conn
        .execute(
            COST_NODE_UPDATE_SQL,
            params![
                node.id.to_string(),
                node.contract_id.to_string(),
                opt_id(node.parent_id),
                node.code,
                node.name,
                opt_decimal(node.budget.as_ref()),
                opt_decimal(node.quantity.as_ref()),
                node.unit.map(|unit| unit.as_str()),
                node.is_active,
            ],
        )
        .map_err(map_sql_error)?;
    ensure_changed(changed, node.id)
}

fn map_cost_node_row(row: &Row<'_>) -> rusqlite::Result<CostNode> {
    Ok(CostNode {
        id: read_uuid(row, 0)?,
        contract_id: read_uuid(row, 1)?,
        parent_id: read_opt_uuid(row, 2)?,
        code: row.get(3)?,
        name: row.get(4)?,
        budget: read_opt_decimal(row, 5)?,
        quantity: read_opt_decimal(row, 6)?,
        unit: read_opt_enum(row, 7)?,
        is_active: row.get(8)?,
    })
}

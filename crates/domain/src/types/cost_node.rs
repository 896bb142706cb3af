//! Cost nodes: the hierarchical budget breakdown of a contract

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invoice_line::UnitOfMeasure;

/// Persisted node of a contract's cost tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostNode {
    pub id: Uuid,
    pub contract_id: Uuid,
    /// `None` only for the contract's root node.
    pub parent_id: Option<Uuid>,
    pub code: String,
    pub name: String,
    pub budget: Option<BigDecimal>,
    pub quantity: Option<BigDecimal>,
    pub unit: Option<UnitOfMeasure>,
    pub is_active: bool,
}

impl CostNode {
    pub fn with_parent_id(self, parent_id: Option<Uuid>) -> Self {
        Self { parent_id, ..self }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self }
    }

    pub fn with_budget(self, budget: Option<BigDecimal>) -> Self {
        Self { budget, ..self }
    }

    pub fn with_active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Nested node definition as authored in a contract structure sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostNodeInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub budget: Option<BigDecimal>,
    #[serde(default)]
    pub quantity: Option<BigDecimal>,
    #[serde(default)]
    pub unit: Option<UnitOfMeasure>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub children: Vec<CostNodeInput>,
}

const fn default_active() -> bool {
    true
}

impl CostNodeInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            budget: None,
            quantity: None,
            unit: None,
            is_active: true,
            children: Vec::new(),
        }
    }

    pub fn with_budget(self, budget: BigDecimal) -> Self {
        Self { budget: Some(budget), ..self }
    }

    pub fn with_quantity(self, quantity: BigDecimal, unit: UnitOfMeasure) -> Self {
        Self { quantity: Some(quantity), unit: Some(unit), ..self }
    }

    pub fn with_active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }

    pub fn with_children(self, children: Vec<CostNodeInput>) -> Self {
        Self { children, ..self }
    }
}

/// Flat spreadsheet row describing a node by its parent's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostNodeRow {
    pub code: String,
    pub parent_code: Option<String>,
    pub name: String,
    pub budget: Option<BigDecimal>,
}

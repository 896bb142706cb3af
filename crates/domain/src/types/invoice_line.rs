//! Invoice lines and per-invoice totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::Amount;
use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    #[serde(rename = "szt")]
    Piece,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "m2")]
    SquareMeter,
    #[serde(rename = "m3")]
    CubicMeter,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "t")]
    Ton,
    #[serde(rename = "h")]
    Hour,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "services")]
    Service,
}

impl_domain_status_conversions!(UnitOfMeasure {
    Piece => "szt",
    Meter => "m",
    SquareMeter => "m2",
    CubicMeter => "m3",
    Kilogram => "kg",
    Ton => "t",
    Hour => "h",
    Day => "day",
    Service => "services",
});

/// Single cost position. A line without an invoice is a cost booked without
/// a document; a line without contract/cost node/cost type is unassigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub contract_id: Option<Uuid>,
    pub cost_node_id: Option<Uuid>,
    pub cost_type_id: Option<Uuid>,
    pub item_name: String,
    pub description: Option<String>,
    pub quantity: Option<BigDecimal>,
    pub unit: UnitOfMeasure,
    pub amount: Amount,
}

impl InvoiceLine {
    /// Contract, cost node and cost type are all assigned.
    pub const fn is_fully_assigned(&self) -> bool {
        self.contract_id.is_some() && self.cost_node_id.is_some() && self.cost_type_id.is_some()
    }

    pub fn with_invoice_id(self, invoice_id: Option<Uuid>) -> Self {
        Self { invoice_id, ..self }
    }

    pub fn with_assignment(
        self,
        contract_id: Option<Uuid>,
        cost_node_id: Option<Uuid>,
        cost_type_id: Option<Uuid>,
    ) -> Self {
        Self { contract_id, cost_node_id, cost_type_id, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub invoice_id: Uuid,
    pub net: BigDecimal,
    pub tax: BigDecimal,
    pub gross: BigDecimal,
}

//! Invoice batch data exchanged with the document and spreadsheet channels

use std::collections::BTreeSet;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use costledger_domain::{
    impl_domain_status_conversions, Amount, CompanyExport, CompanyInput, InvoiceStatus,
    PaymentMethod, PaymentStatus, UnitOfMeasure,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a batch row asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceCommand {
    #[default]
    Apply,
    Modify,
    Delete,
}

impl_domain_status_conversions!(InvoiceCommand {
    Apply => "apply",
    Modify => "modify",
    Delete => "delete",
});

/// What happened to an invoice during `apply`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceApplyAction {
    Applied,
    Modified,
    Deleted,
    Skipped,
}

impl_domain_status_conversions!(InvoiceApplyAction {
    Applied => "applied",
    Modified => "modified",
    Deleted => "deleted",
    Skipped => "skipped",
});

impl InvoiceApplyAction {
    /// Lines of invoices with this outcome are not written.
    pub const fn skips_lines(self) -> bool {
        matches!(self, Self::Deleted | Self::Skipped)
    }
}

/// Invoice header as read from a document or a spreadsheet row, before the
/// buyer and seller are resolved to companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    #[serde(default)]
    pub command: InvoiceCommand,
    pub invoice_number: String,
    #[serde(default)]
    pub old_invoice_number: Option<String>,
    pub invoice_date: NaiveDate,
    pub selling_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    pub fn resolve(self, buyer_id: Uuid, seller_id: Uuid) -> ResolvedInvoiceUpdate {
        ResolvedInvoiceUpdate {
            command: self.command,
            invoice_number: self.invoice_number,
            old_invoice_number: self.old_invoice_number,
            invoice_date: self.invoice_date,
            selling_date: self.selling_date,
            buyer_id,
            seller_id,
            payment_method: self.payment_method,
            due_date: self.due_date,
            payment_status: self.payment_status,
            status: self.status,
        }
    }
}

/// Invoice update with buyer and seller already resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInvoiceUpdate {
    pub command: InvoiceCommand,
    pub invoice_number: String,
    pub old_invoice_number: Option<String>,
    pub invoice_date: NaiveDate,
    pub selling_date: NaiveDate,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub payment_method: PaymentMethod,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub status: InvoiceStatus,
}

impl ResolvedInvoiceUpdate {
    pub fn with_command(mut self, command: InvoiceCommand) -> Self {
        self.command = command;
        self
    }

    pub fn with_old_invoice_number(mut self, old_invoice_number: impl Into<String>) -> Self {
        self.old_invoice_number = Some(old_invoice_number.into());
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }
}

/// Outcome of one invoice of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRefResult {
    pub invoice_id: Option<Uuid>,
    pub action: InvoiceApplyAction,
    pub invoice_number: String,
    pub old_invoice_number: Option<String>,
}

/// Invoice line as written by a channel. Assignment is by code; a missing
/// `invoice_number` means a cost without an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLineUpdate {
    #[serde(default)]
    pub invoice_line_id: Option<Uuid>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    pub item_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<BigDecimal>,
    pub unit: UnitOfMeasure,
    pub amount: Amount,
    #[serde(default)]
    pub contract_code: Option<String>,
    #[serde(default)]
    pub cost_node_code: Option<String>,
    #[serde(default)]
    pub cost_type_code: Option<String>,
}

impl InvoiceLineUpdate {
    pub fn new(item_name: impl Into<String>, unit: UnitOfMeasure, amount: Amount) -> Self {
        Self {
            invoice_line_id: None,
            invoice_number: None,
            item_name: item_name.into(),
            description: None,
            quantity: None,
            unit,
            amount,
            contract_code: None,
            cost_node_code: None,
            cost_type_code: None,
        }
    }

    pub fn with_invoice_line_id(mut self, id: Uuid) -> Self {
        self.invoice_line_id = Some(id);
        self
    }

    pub fn with_invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = Some(invoice_number.into());
        self
    }

    pub fn with_quantity(mut self, quantity: BigDecimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignment(
        mut self,
        contract_code: impl Into<String>,
        cost_node_code: impl Into<String>,
        cost_type_code: impl Into<String>,
    ) -> Self {
        self.contract_code = Some(contract_code.into());
        self.cost_node_code = Some(cost_node_code.into());
        self.cost_type_code = Some(cost_type_code.into());
        self
    }

    /// Contract, cost node and cost type are all given.
    pub fn is_complete(&self) -> bool {
        [&self.contract_code, &self.cost_node_code, &self.cost_type_code]
            .iter()
            .all(|code| code.as_deref().is_some_and(|c| !c.trim().is_empty()))
    }
}

/// Invoices and lines ready for [`super::InvoiceIngestOrchestrator`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceIngestBatch {
    pub invoices: Vec<ResolvedInvoiceUpdate>,
    pub lines: Vec<InvoiceLineUpdate>,
}

/// One parsed document: a single invoice, its lines and the raw parties
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceParseResult {
    pub invoice: InvoiceDraft,
    pub lines: Vec<InvoiceLineUpdate>,
    pub buyer: CompanyInput,
    pub seller: CompanyInput,
}

/// Spreadsheet invoice row; parties are given by tax number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceExcelRow {
    #[serde(flatten)]
    pub invoice: InvoiceDraft,
    pub buyer_tax_number: Option<String>,
    pub seller_tax_number: Option<String>,
}

/// A whole assignment spreadsheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceExcelBatch {
    pub invoices: Vec<InvoiceExcelRow>,
    pub lines: Vec<InvoiceLineUpdate>,
    pub companies: Vec<CompanyExport>,
}

/// Result of one ingest call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Per-invoice outcome keyed by invoice number, in batch order
    pub refs: IndexMap<String, InvoiceRefResult>,
    /// Invoices whose every line in the batch is fully assigned
    pub fully_assigned: BTreeSet<Uuid>,
    /// Invoices moved to PROCESSED by this call
    pub finalized: BTreeSet<Uuid>,
}

//! Port interfaces for invoice and invoice line persistence

use std::collections::BTreeSet;

use costledger_domain::{Invoice, InvoiceLine, InvoiceStatus, Result};
use uuid::Uuid;

/// Trait for invoice persistence
pub trait InvoiceRepository: Send + Sync {
    fn add(&self, invoice: &Invoice) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<Invoice>>;

    fn list(&self) -> Result<Vec<Invoice>>;

    fn update(&self, invoice: &Invoice) -> Result<()>;

    /// Look up an invoice by its identity key
    fn get_unique_invoice(&self, invoice_number: &str, seller_id: Uuid) -> Result<Option<Invoice>>;

    /// Invoices in any of the given statuses
    fn get_for_assignment(&self, statuses: &[InvoiceStatus]) -> Result<Vec<Invoice>>;
}

/// Trait for invoice line persistence
pub trait InvoiceLineRepository: Send + Sync {
    fn add(&self, line: &InvoiceLine) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<InvoiceLine>>;

    fn update(&self, line: &InvoiceLine) -> Result<()>;

    fn list_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<InvoiceLine>>;

    fn list_by_invoice_ids(&self, invoice_ids: &[Uuid]) -> Result<Vec<InvoiceLine>>;

    /// Costs without an invoice
    fn list_by_null_invoice(&self) -> Result<Vec<InvoiceLine>>;

    /// Lines still missing a contract, cost node or cost type
    fn get_for_assignment(&self) -> Result<Vec<InvoiceLine>>;

    /// Delete lines of `invoice_id` whose id is not in `keep_ids`; returns the
    /// number of deleted lines
    fn delete_not_in_ids(&self, invoice_id: Uuid, keep_ids: &BTreeSet<Uuid>) -> Result<usize>;
}

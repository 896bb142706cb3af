//! Invoice header application
//!
//! Invoices are identified by (invoice number, seller). Finalized invoices
//! are never touched again; replaying a batch only reports them as skipped.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use costledger_domain::{Invoice, InvoiceStatus, LedgerError, Result};
use indexmap::IndexMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{InvoiceApplyAction, InvoiceCommand, InvoiceRefResult, ResolvedInvoiceUpdate};
use super::ports::InvoiceRepository;

pub struct InvoiceUpdateService {
    invoices: Arc<dyn InvoiceRepository>,
}

impl InvoiceUpdateService {
    pub fn new(invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { invoices }
    }

    /// Apply a batch of invoice updates in order.
    ///
    /// # Errors
    /// A blank or repeated invoice number rejects the whole batch before any
    /// write. A MODIFY whose old number cannot be found fails with
    /// [`LedgerError::NotFound`].
    pub fn apply(
        &self,
        updates: &[ResolvedInvoiceUpdate],
    ) -> Result<IndexMap<String, InvoiceRefResult>> {
        check_invoice_numbers(updates)?;

        let mut refs = IndexMap::with_capacity(updates.len());
        for update in updates {
            let result = self.apply_one(update)?;
            info!(
                invoice_number = %result.invoice_number,
                action = %result.action,
                "invoice applied"
            );
            refs.insert(result.invoice_number.clone(), result);
        }
        Ok(refs)
    }

    fn apply_one(&self, update: &ResolvedInvoiceUpdate) -> Result<InvoiceRefResult> {
        let number = update.invoice_number.trim();
        let existing = self.invoices.get_unique_invoice(number, update.seller_id)?;

        if let Some(invoice) = existing.as_ref().filter(|invoice| invoice.status.is_terminal()) {
            return Ok(ref_result(update, Some(invoice.id), InvoiceApplyAction::Skipped));
        }

        if update.command == InvoiceCommand::Delete {
            let Some(invoice) = existing else {
                return Ok(ref_result(update, None, InvoiceApplyAction::Skipped));
            };
            let id = invoice.id;
            self.invoices.update(&invoice.with_status(InvoiceStatus::Deleted))?;
            return Ok(ref_result(update, Some(id), InvoiceApplyAction::Deleted));
        }

        if let Some(invoice) = existing {
            let updated = overwrite(invoice.id, number, update);
            self.invoices.update(&updated)?;
            return Ok(ref_result(update, Some(updated.id), InvoiceApplyAction::Applied));
        }

        let superseded = match update.old_invoice_number.as_deref().map(str::trim) {
            Some(old) if !old.is_empty() && old != number => Some(self.find_in_progress(old, update)?),
            _ => None,
        };

        let created = overwrite(Uuid::new_v4(), number, update);
        self.invoices.add(&created)?;

        match superseded {
            Some(old) => {
                info!(old = %old.invoice_number, new = number, "invoice renumbered");
                self.invoices.update(&old.with_status(InvoiceStatus::Deleted))?;
                Ok(ref_result(update, Some(created.id), InvoiceApplyAction::Modified))
            }
            None => Ok(ref_result(update, Some(created.id), InvoiceApplyAction::Applied)),
        }
    }

    fn find_in_progress(&self, old_number: &str, update: &ResolvedInvoiceUpdate) -> Result<Invoice> {
        self.invoices
            .get_for_assignment(&[InvoiceStatus::InProgress])?
            .into_iter()
            .find(|invoice| invoice.invoice_number == old_number && invoice.seller_id == update.seller_id)
            .ok_or_else(|| {
                LedgerError::NotFound(format!("Invoice to modify not found: {old_number}"))
            })
    }

    /// Move invoices to PROCESSED; already processed ones are left alone.
    pub fn mark_processed(&self, invoice_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let mut finalized = Vec::new();
        for id in invoice_ids {
            let invoice = self
                .invoices
                .get(*id)?
                .ok_or_else(|| LedgerError::NotFound("Invoice not found".into()))?;

            match invoice.status {
                InvoiceStatus::Processed => continue,
                InvoiceStatus::Deleted => {
                    warn!(invoice_number = %invoice.invoice_number, "deleted invoice not finalized");
                    continue;
                }
                _ => {}
            }

            self.invoices.update(&invoice.with_status(InvoiceStatus::Processed))?;
            finalized.push(*id);
        }
        Ok(finalized)
    }
}

fn check_invoice_numbers(updates: &[ResolvedInvoiceUpdate]) -> Result<()> {
    let mut seen = HashSet::new();
    for update in updates {
        let number = update.invoice_number.trim();
        if number.is_empty() {
            return Err(LedgerError::validation("Invoice number is required"));
        }
        if !seen.insert(number) {
            return Err(LedgerError::validation(format!(
                "Duplicate invoice number in batch: {number}"
            )));
        }
    }
    Ok(())
}

fn overwrite(id: Uuid, number: &str, update: &ResolvedInvoiceUpdate) -> Invoice {
    Invoice {
        id,
        invoice_number: number.to_string(),
        invoice_date: update.invoice_date,
        selling_date: update.selling_date,
        buyer_id: update.buyer_id,
        seller_id: update.seller_id,
        payment_method: update.payment_method,
        due_date: update.due_date,
        payment_status: update.payment_status,
        status: update.status,
        timestamp: Utc::now(),
    }
}

fn ref_result(
    update: &ResolvedInvoiceUpdate,
    invoice_id: Option<Uuid>,
    action: InvoiceApplyAction,
) -> InvoiceRefResult {
    InvoiceRefResult {
        invoice_id,
        action,
        invoice_number: update.invoice_number.trim().to_string(),
        old_invoice_number: update.old_invoice_number.clone(),
    }
}

//! Invoice ingest entry points
//!
//! Documents never finalize invoices; only a spreadsheet batch, where an
//! operator has assigned every line, can move an invoice to PROCESSED.

use std::collections::BTreeSet;
use std::sync::Arc;

use costledger_domain::Result;
use tracing::info;
use uuid::Uuid;

use super::dto::{IngestReport, InvoiceIngestBatch};
use super::line_service::InvoiceLineUpdateService;
use super::update_service::InvoiceUpdateService;

pub struct InvoiceIngestOrchestrator {
    invoices: Arc<InvoiceUpdateService>,
    lines: Arc<InvoiceLineUpdateService>,
}

impl InvoiceIngestOrchestrator {
    pub fn new(invoices: Arc<InvoiceUpdateService>, lines: Arc<InvoiceLineUpdateService>) -> Self {
        Self { invoices, lines }
    }

    /// Apply a parsed document. Invoices stay open for review.
    pub fn ingest_from_pdf(&self, batch: &InvoiceIngestBatch) -> Result<IngestReport> {
        let refs = self.invoices.apply(&batch.invoices)?;
        let fully_assigned = self.lines.apply(&batch.lines, &refs)?;

        info!(invoices = refs.len(), lines = batch.lines.len(), "document batch ingested");
        Ok(IngestReport { refs, fully_assigned, finalized: BTreeSet::new() })
    }

    /// Apply a spreadsheet batch and finalize fully assigned invoices.
    pub fn ingest_from_excel(&self, batch: &InvoiceIngestBatch) -> Result<IngestReport> {
        let refs = self.invoices.apply(&batch.invoices)?;
        let fully_assigned = self.lines.apply(&batch.lines, &refs)?;

        let finalized: BTreeSet<Uuid> = if fully_assigned.is_empty() {
            BTreeSet::new()
        } else {
            let ids: Vec<Uuid> = fully_assigned.iter().copied().collect();
            self.invoices.mark_processed(&ids)?.into_iter().collect()
        };

        info!(
            invoices = refs.len(),
            lines = batch.lines.len(),
            finalized = finalized.len(),
            "spreadsheet batch ingested"
        );
        Ok(IngestReport { refs, fully_assigned, finalized })
    }
}

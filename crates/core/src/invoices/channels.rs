//! Channel adapters: resolve the parties of a parsed document or a
//! spreadsheet, then hand the batch to the ingest orchestrator.

use std::sync::Arc;

use costledger_domain::{CompanyRole, Result};
use tracing::info;

use super::dto::{
    IngestReport, InvoiceExcelBatch, InvoiceExcelRow, InvoiceIngestBatch, InvoiceParseResult,
    ResolvedInvoiceUpdate,
};
use super::orchestrator::InvoiceIngestOrchestrator;
use crate::companies::{ApplyCompanyExcelBatchService, CompanyEvaluateOrchestrator};

pub struct InvoiceDocumentIngestService {
    companies: Arc<CompanyEvaluateOrchestrator>,
    ingest: Arc<InvoiceIngestOrchestrator>,
}

impl InvoiceDocumentIngestService {
    pub fn new(
        companies: Arc<CompanyEvaluateOrchestrator>,
        ingest: Arc<InvoiceIngestOrchestrator>,
    ) -> Self {
        Self { companies, ingest }
    }

    pub fn ingest(&self, parsed: InvoiceParseResult) -> Result<IngestReport> {
        let mut seller_input = parsed.seller;
        seller_input.role.get_or_insert(CompanyRole::Seller);
        let mut buyer_input = parsed.buyer;
        buyer_input.role.get_or_insert(CompanyRole::Buyer);

        let seller = self.companies.evaluate(&seller_input)?;
        let buyer = self.companies.resolve_buyer(&buyer_input)?;
        info!(seller = %seller.name, buyer = %buyer.name, "document parties resolved");

        let invoice = parsed.invoice.resolve(buyer.id, seller.id);
        let lines = parsed
            .lines
            .into_iter()
            .map(|line| line.with_invoice_number(invoice.invoice_number.clone()))
            .collect();

        self.ingest.ingest_from_pdf(&InvoiceIngestBatch { invoices: vec![invoice], lines })
    }
}

pub struct InvoiceSpreadsheetIngestService {
    company_rows: Arc<ApplyCompanyExcelBatchService>,
    companies: Arc<CompanyEvaluateOrchestrator>,
    ingest: Arc<InvoiceIngestOrchestrator>,
}

impl InvoiceSpreadsheetIngestService {
    pub fn new(
        company_rows: Arc<ApplyCompanyExcelBatchService>,
        companies: Arc<CompanyEvaluateOrchestrator>,
        ingest: Arc<InvoiceIngestOrchestrator>,
    ) -> Self {
        Self { company_rows, companies, ingest }
    }

    pub fn ingest(&self, batch: InvoiceExcelBatch) -> Result<IngestReport> {
        let summary = self.company_rows.apply(&batch.companies)?;
        info!(rows = summary.rows.len(), "spreadsheet companies applied");

        let invoices = batch
            .invoices
            .into_iter()
            .map(|row| self.resolve_row(row))
            .collect::<Result<Vec<_>>>()?;

        self.ingest.ingest_from_excel(&InvoiceIngestBatch { invoices, lines: batch.lines })
    }

    fn resolve_row(&self, row: InvoiceExcelRow) -> Result<ResolvedInvoiceUpdate> {
        let buyer =
            self.companies.evaluate_from_tax(row.buyer_tax_number.as_deref(), CompanyRole::Buyer)?;
        let seller = self
            .companies
            .evaluate_from_tax(row.seller_tax_number.as_deref(), CompanyRole::Seller)?;
        Ok(row.invoice.resolve(buyer.id, seller.id))
    }
}

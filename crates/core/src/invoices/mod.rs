//! Invoice ingestion: headers, lines, finalization and channel adapters

pub mod channels;
pub mod dto;
pub mod line_service;
pub mod orchestrator;
pub mod ports;
pub mod totals;
pub mod update_service;

pub use channels::{InvoiceDocumentIngestService, InvoiceSpreadsheetIngestService};
pub use dto::{
    IngestReport, InvoiceApplyAction, InvoiceCommand, InvoiceDraft, InvoiceExcelBatch,
    InvoiceExcelRow, InvoiceIngestBatch, InvoiceLineUpdate, InvoiceParseResult, InvoiceRefResult,
    ResolvedInvoiceUpdate,
};
pub use line_service::InvoiceLineUpdateService;
pub use orchestrator::InvoiceIngestOrchestrator;
pub use ports::{InvoiceLineRepository, InvoiceRepository};
pub use totals::InvoiceTotalsService;
pub use update_service::InvoiceUpdateService;

use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use costledger_domain::constants::MONEY_SCALE;
use costledger_domain::{InvoiceTotals, Result};
use uuid::Uuid;

use super::ports::InvoiceLineRepository;

/// Net, tax and gross sums over an invoice's lines
pub struct InvoiceTotalsService {
    lines: Arc<dyn InvoiceLineRepository>,
}

impl InvoiceTotalsService {
    pub fn new(lines: Arc<dyn InvoiceLineRepository>) -> Self {
        Self { lines }
    }

    pub fn totals(&self, invoice_id: Uuid) -> Result<InvoiceTotals> {
        let lines = self.lines.list_by_invoice(invoice_id)?;

        let (net, tax, gross) = lines.iter().fold(
            (BigDecimal::zero(), BigDecimal::zero(), BigDecimal::zero()),
            |(net, tax, gross), line| {
                (net + line.amount.net(), tax + line.amount.tax(), gross + line.amount.gross())
            },
        );

        Ok(InvoiceTotals {
            invoice_id,
            net: net.with_scale(MONEY_SCALE),
            tax: tax.with_scale(MONEY_SCALE),
            gross: gross.with_scale(MONEY_SCALE),
        })
    }
}

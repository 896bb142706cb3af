//! Invoices and their workflow status

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Card,
    Blik,
}

impl_domain_status_conversions!(PaymentMethod {
    BankTransfer => "bank_transfer",
    Cash => "cash",
    Card => "card",
    Blik => "blik",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl_domain_status_conversions!(PaymentStatus {
    Unpaid => "unpaid",
    PartiallyPaid => "partially_paid",
    Paid => "paid",
});

/// Workflow status. `Processed` and `Deleted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    New,
    InProgress,
    Processed,
    Deleted,
    Modified,
}

impl_domain_status_conversions!(InvoiceStatus {
    New => "new",
    InProgress => "in_progress",
    Processed => "processed",
    Deleted => "deleted",
    Modified => "modified",
});

impl InvoiceStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub selling_date: NaiveDate,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub payment_method: PaymentMethod,
    pub due_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub status: InvoiceStatus,
    /// Last modification time.
    pub timestamp: DateTime<Utc>,
}

impl Invoice {
    /// Copy with a new status and a refreshed timestamp.
    pub fn with_status(self, status: InvoiceStatus) -> Self {
        Self { status, timestamp: Utc::now(), ..self }
    }
}

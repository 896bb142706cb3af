//! Ledger value types
//!
//! Every entity is an immutable value: updates go through `with_*` copy
//! methods that return a new instance.

pub mod amount;
pub mod company;
pub mod contract;
pub mod cost_node;
pub mod cost_type;
pub mod invoice;
pub mod invoice_line;

pub use amount::{Amount, TaxTreatment, VatRate};
pub use company::{
    Address, BankAccount, Company, CompanyExport, CompanyInput, CompanyRole, Contact,
};
pub use contract::{Contract, ContractMetadata, ContractStarter, ContractStatus};
pub use cost_node::{CostNode, CostNodeInput, CostNodeRow};
pub use cost_type::CostType;
pub use invoice::{Invoice, InvoiceStatus, PaymentMethod, PaymentStatus};
pub use invoice_line::{InvoiceLine, InvoiceTotals, UnitOfMeasure};

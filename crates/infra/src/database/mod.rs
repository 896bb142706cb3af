//! SQLite persistence for the ledger ports

mod codec;
pub mod company_repository;
pub mod contract_repository;
pub mod cost_node_repository;
pub mod cost_type_repository;
pub mod invoice_line_repository;
pub mod invoice_repository;
pub mod manager;

pub use company_repository::SqliteCompanyRepository;
pub use contract_repository::SqliteContractRepository;
pub use cost_node_repository::SqliteCostNodeRepository;
pub use cost_type_repository::SqliteCostTypeRepository;
pub use invoice_line_repository::SqliteInvoiceLineRepository;
pub use invoice_repository::SqliteInvoiceRepository;
pub use manager::{DbManager, SqliteConnection};

//! # Costledger Core
//!
//! Reconciliation logic for construction contract costs - no infrastructure
//! dependencies.
//!
//! This crate contains:
//! - Cost node tree building and validation
//! - Company resolution (candidate providers, quality scoring, merging)
//! - Contract, company and cost type services
//! - Invoice and invoice line ingestion
//! - Port interfaces (traits) for every repository
//!
//! ## Architecture Principles
//! - Only depends on `costledger-domain`
//! - No database or platform code
//! - All storage access via traits
//! - Synchronous, caller-serialized batches

pub mod companies;
pub mod contracts;
pub mod cost_nodes;
pub mod cost_types;
pub mod invoices;

// Re-export specific items to avoid ambiguity
pub use companies::ports::{CompanyArbiter, CompanyRepository};
pub use companies::{CompanyCandidateProvider, CompanyEvaluateOrchestrator, CompositeCandidateProvider};
pub use contracts::ports::ContractRepository;
pub use contracts::{
    ContractCostNodeService, ContractStructureUpdate, CreateContractService,
    UpdateContractService, UpdateContractStructureService,
};
pub use cost_nodes::ports::CostNodeRepository;
pub use cost_nodes::{CostNodeEntityValidator, CostNodeStructureValidator, CostNodeTreeBuilder};
pub use cost_types::ports::CostTypeRepository;
pub use invoices::ports::{InvoiceLineRepository, InvoiceRepository};
pub use invoices::{InvoiceIngestOrchestrator, InvoiceLineUpdateService, InvoiceUpdateService};

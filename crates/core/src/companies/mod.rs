//! Company resolution and master data
//!
//! Unresolved mentions from invoices flow through candidate providers and
//! quality scoring into `CompanyEvaluateOrchestrator`; manual and spreadsheet
//! edits go through the master-data services.

pub mod evaluate;
pub mod excel_batch;
pub mod fields;
pub mod normalize;
pub mod ports;
pub mod providers;
pub mod quality;
pub mod services;

pub use evaluate::CompanyEvaluateOrchestrator;
pub use excel_batch::{ApplyCompanyExcelBatchService, CompanyBatchSummary, CompanyRowOutcome};
pub use fields::{apply_field, FieldUpdater, FIELD_UPDATERS};
pub use ports::{CompanyArbiter, CompanyRepository};
pub use providers::{
    AddressProvider, BankAccountProvider, CompanyCandidateProvider, CompositeCandidateProvider,
    EmailProvider, ExactTaxNumberProvider, NameProvider, PhoneProvider,
};
pub use quality::{CompanyDataQuality, CompanyDataSource, CompanyField};
pub use services::{
    ChangeCompanyRoleService, CompanyInputValidator, CompanyNormalizeService,
    CreateCompanyService, NewCompany, UpdateCompanyService,
};

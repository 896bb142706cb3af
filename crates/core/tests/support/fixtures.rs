//! Fixtures shared by the scenario tests

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use costledger_core::companies::{
    ApplyCompanyExcelBatchService, CompanyEvaluateOrchestrator, CompositeCandidateProvider,
};
use costledger_core::contracts::CreateContractService;
use costledger_core::invoices::{
    InvoiceDraft, InvoiceIngestOrchestrator, InvoiceLineUpdate, InvoiceLineUpdateService,
    InvoiceUpdateService, ResolvedInvoiceUpdate,
};
use costledger_core::{
    CompanyRepository, ContractRepository, CostNodeRepository, CostTypeRepository,
    InvoiceLineRepository, InvoiceRepository,
};
use costledger_domain::{
    Amount, Company, CompanyRole, Contract, ContractMetadata, ContractStarter, ContractStatus,
    CostNodeInput, CostType, InvoiceStatus, PaymentMethod, PaymentStatus,
    UnitOfMeasure, VatRate,
};
use uuid::Uuid;

use super::repositories::MockLedger;

/// Valid NIP numbers (mod-11 checksum passes).
pub const OWNER_NIP: &str = "5260250274";
pub const SUPPLIER_NIP: &str = "3982597916";
pub const CLIENT_NIP: &str = "9074833787";
pub const OTHER_NIP: &str = "8762328602";

pub fn money(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

/// Typed handles onto one shared [`MockLedger`].
pub struct TestLedger {
    pub store: Arc<MockLedger>,
}

impl TestLedger {
    pub fn new() -> Self {
        Self { store: MockLedger::new() }
    }

    pub fn companies(&self) -> Arc<dyn CompanyRepository> {
        self.store.clone()
    }

    pub fn contracts(&self) -> Arc<dyn ContractRepository> {
        self.store.clone()
    }

    pub fn cost_nodes(&self) -> Arc<dyn CostNodeRepository> {
        self.store.clone()
    }

    pub fn cost_types(&self) -> Arc<dyn CostTypeRepository> {
        self.store.clone()
    }

    pub fn invoices(&self) -> Arc<dyn InvoiceRepository> {
        self.store.clone()
    }

    pub fn lines(&self) -> Arc<dyn InvoiceLineRepository> {
        self.store.clone()
    }

    pub fn evaluator(&self) -> CompanyEvaluateOrchestrator {
        let companies = self.companies();
        let provider = Arc::new(CompositeCandidateProvider::standard(&companies));
        CompanyEvaluateOrchestrator::new(companies, provider)
    }

    pub fn invoice_service(&self) -> Arc<InvoiceUpdateService> {
        Arc::new(InvoiceUpdateService::new(self.invoices()))
    }

    pub fn line_service(&self) -> Arc<InvoiceLineUpdateService> {
        Arc::new(InvoiceLineUpdateService::new(
            self.lines(),
            self.contracts(),
            self.cost_nodes(),
            self.cost_types(),
        ))
    }

    pub fn ingest(&self) -> Arc<InvoiceIngestOrchestrator> {
        Arc::new(InvoiceIngestOrchestrator::new(self.invoice_service(), self.line_service()))
    }

    pub fn company_rows(&self) -> Arc<ApplyCompanyExcelBatchService> {
        Arc::new(ApplyCompanyExcelBatchService::new(self.companies()))
    }

    pub fn seed_company(&self, name: &str, tax_number: &str, role: CompanyRole) -> Company {
        let company = Company::new(name, tax_number, role);
        self.companies().add(&company).unwrap();
        company
    }

    pub fn seed_cost_type(&self, code: &str) -> CostType {
        let cost_type = CostType::new(code, code.to_lowercase());
        self.cost_types().add(&cost_type).unwrap();
        cost_type
    }

    /// Contract `code` with tree ROOT -> [A -> [A1, A2], B].
    pub fn seed_contract(&self, code: &str) -> Contract {
        let owner = self.seed_company("Owner SA", OWNER_NIP, CompanyRole::Own);
        let client = self.seed_company("Client SA", CLIENT_NIP, CompanyRole::Client);

        let mut service =
            CreateContractService::new(self.contracts(), self.cost_nodes(), self.companies());
        service
            .init(ContractStarter {
                code: code.to_string(),
                owner_id: owner.id,
                client_id: client.id,
                metadata: metadata(code, ContractStatus::Active),
            })
            .unwrap();
        service.add_cost_node_tree(sample_tree()).unwrap();
        service.execute().unwrap()
    }
}

pub fn metadata(name: &str, status: ContractStatus) -> ContractMetadata {
    ContractMetadata {
        name: name.to_string(),
        description: None,
        start_date: Some(date("2024-01-01")),
        end_date: None,
        budget: Some(money("1000")),
        path: None,
        status,
    }
}

pub fn sample_tree() -> Vec<CostNodeInput> {
    vec![
        CostNodeInput::new("A", "Foundations").with_budget(money("100")).with_children(vec![
            CostNodeInput::new("A1", "Excavation").with_budget(money("40")),
            CostNodeInput::new("A2", "Concrete").with_budget(money("60")),
        ]),
        CostNodeInput::new("B", "Walls").with_budget(money("200")),
    ]
}

pub fn draft(number: &str, status: InvoiceStatus) -> InvoiceDraft {
    InvoiceDraft {
        command: Default::default(),
        invoice_number: number.to_string(),
        old_invoice_number: None,
        invoice_date: date("2024-03-01"),
        selling_date: date("2024-03-01"),
        payment_method: PaymentMethod::BankTransfer,
        due_date: date("2024-03-15"),
        payment_status: PaymentStatus::Unpaid,
        status,
    }
}

pub fn resolved(number: &str, buyer_id: Uuid, seller_id: Uuid) -> ResolvedInvoiceUpdate {
    draft(number, InvoiceStatus::InProgress).resolve(buyer_id, seller_id)
}

pub fn line(item_name: &str, value: &str) -> InvoiceLineUpdate {
    InvoiceLineUpdate::new(item_name, UnitOfMeasure::Piece, Amount::new(money(value), VatRate::Vat23))
}

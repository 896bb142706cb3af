//! Shared harness for the infra integration tests

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use costledger_domain::{Company, CompanyRole, ContractMetadata, ContractStatus, CostNodeInput};
use costledger_infra::database::DbManager;
use costledger_infra::LedgerRepositories;
use tempfile::TempDir;

pub const OWNER_NIP: &str = "5260250274";
pub const CLIENT_NIP: &str = "9074833787";
pub const SUPPLIER_NIP: &str = "3982597916";

/// Temporary database that keeps its directory alive for the test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    pub repositories: LedgerRepositories,
    _temp_dir: TempDir,
}

impl TestDatabase {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("ledger.db");

        let manager =
            Arc::new(DbManager::new(&db_path, 2).expect("db manager should be created"));
        manager.run_migrations().expect("schema migrations should apply");
        let repositories = LedgerRepositories::sqlite(&manager);

        Self { manager, repositories, _temp_dir: temp_dir }
    }

    pub fn seed_company(&self, name: &str, tax_number: &str, role: CompanyRole) -> Company {
        let company = Company::new(name, tax_number, role);
        self.repositories.companies.add(&company).expect("company insert should succeed");
        company
    }
}

pub fn money(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).expect("valid decimal literal")
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date literal")
}

pub fn metadata(name: &str, status: ContractStatus) -> ContractMetadata {
    ContractMetadata {
        name: name.to_string(),
        description: Some("Residential block".to_string()),
        start_date: Some(date("2024-01-01")),
        end_date: Some(date("2025-06-30")),
        budget: Some(money("1000.50")),
        path: None,
        status,
    }
}

/// A -> [A1, A2], B
pub fn sample_tree() -> Vec<CostNodeInput> {
    vec![
        CostNodeInput::new("A", "Foundations").with_budget(money("100")).with_children(vec![
            CostNodeInput::new("A1", "Excavation").with_budget(money("40")),
            CostNodeInput::new("A2", "Concrete").with_budget(money("60")),
        ]),
        CostNodeInput::new("B", "Walls").with_budget(money("200")),
    ]
}

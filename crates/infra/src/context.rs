//! Ledger context - dependency injection container
//!
//! Wires the repository backend chosen in [`LedgerConfig`] into the core
//! services. Stateful builders (contract creation) are handed out fresh per
//! call; everything else is shared.

use std::sync::Arc;

use costledger_core::companies::{
    ApplyCompanyExcelBatchService, ChangeCompanyRoleService, CreateCompanyService,
    UpdateCompanyService,
};
use costledger_core::cost_types::CostTypeService;
use costledger_core::invoices::{
    InvoiceDocumentIngestService, InvoiceSpreadsheetIngestService, InvoiceTotalsService,
};
use costledger_core::{
    CompanyArbiter, CompanyEvaluateOrchestrator, CompanyRepository, CompositeCandidateProvider,
    ContractCostNodeService, ContractRepository, CostNodeRepository, CostTypeRepository,
    CreateContractService, InvoiceIngestOrchestrator, InvoiceLineRepository,
    InvoiceLineUpdateService, InvoiceRepository, InvoiceUpdateService, UpdateContractService,
    UpdateContractStructureService,
};
use costledger_domain::{LedgerConfig, Result, StorageBackend};
use tracing::info;

use crate::database::{
    DbManager, SqliteCompanyRepository, SqliteContractRepository, SqliteCostNodeRepository,
    SqliteCostTypeRepository, SqliteInvoiceLineRepository, SqliteInvoiceRepository,
};
use crate::memory::MemoryLedgerStore;

/// Repository handles for one storage backend.
#[derive(Clone)]
pub struct LedgerRepositories {
    pub companies: Arc<dyn CompanyRepository>,
    pub contracts: Arc<dyn ContractRepository>,
    pub cost_nodes: Arc<dyn CostNodeRepository>,
    pub cost_types: Arc<dyn CostTypeRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub invoice_lines: Arc<dyn InvoiceLineRepository>,
}

impl LedgerRepositories {
    pub fn sqlite(db: &Arc<DbManager>) -> Self {
        Self {
            companies: Arc::new(SqliteCompanyRepository::new(Arc::clone(db))),
            contracts: Arc::new(SqliteContractRepository::new(Arc::clone(db))),
            cost_nodes: Arc::new(SqliteCostNodeRepository::new(Arc::clone(db))),
            cost_types: Arc::new(SqliteCostTypeRepository::new(Arc::clone(db))),
            invoices: Arc::new(SqliteInvoiceRepository::new(Arc::clone(db))),
            invoice_lines: Arc::new(SqliteInvoiceLineRepository::new(Arc::clone(db))),
        }
    }

    pub fn memory(store: &MemoryLedgerStore) -> Self {
        Self {
            companies: Arc::new(store.clone()),
            contracts: Arc::new(store.clone()),
            cost_nodes: Arc::new(store.clone()),
            cost_types: Arc::new(store.clone()),
            invoices: Arc::new(store.clone()),
            invoice_lines: Arc::new(store.clone()),
        }
    }
}

/// Application context - holds the repositories and shared services
pub struct LedgerContext {
    pub config: LedgerConfig,
    /// Present only for the SQLite backend.
    pub db: Option<Arc<DbManager>>,
    pub repositories: LedgerRepositories,
    pub evaluator: Arc<CompanyEvaluateOrchestrator>,
    pub company_rows: Arc<ApplyCompanyExcelBatchService>,
    pub invoice_updates: Arc<InvoiceUpdateService>,
    pub line_updates: Arc<InvoiceLineUpdateService>,
    pub ingest: Arc<InvoiceIngestOrchestrator>,
    pub totals: Arc<InvoiceTotalsService>,
}

impl LedgerContext {
    /// Open the configured backend and wire every service.
    ///
    /// # Errors
    /// Returns `LedgerError::Database` if the SQLite pool cannot be opened or
    /// migrated.
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let (db, repositories) = match config.storage {
            StorageBackend::Sqlite => {
                let db =
                    Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
                db.run_migrations()?;
                let repositories = LedgerRepositories::sqlite(&db);
                (Some(db), repositories)
            }
            StorageBackend::Memory => {
                (None, LedgerRepositories::memory(&MemoryLedgerStore::new()))
            }
        };

        info!(storage = %config.storage, "Ledger context initialised");
        Ok(Self::assemble(config.clone(), db, repositories, None))
    }

    /// Rebuild the resolution services around an owner arbiter.
    pub fn with_arbiter(self, arbiter: Arc<dyn CompanyArbiter>) -> Self {
        Self::assemble(self.config, self.db, self.repositories, Some(arbiter))
    }

    fn assemble(
        config: LedgerConfig,
        db: Option<Arc<DbManager>>,
        repositories: LedgerRepositories,
        arbiter: Option<Arc<dyn CompanyArbiter>>,
    ) -> Self {
        let provider = Arc::new(CompositeCandidateProvider::standard(&repositories.companies));
        let mut evaluator =
            CompanyEvaluateOrchestrator::new(Arc::clone(&repositories.companies), provider)
                .with_resolution(config.resolution.clone());
        if let Some(arbiter) = arbiter {
            evaluator = evaluator.with_arbiter(arbiter);
        }

        let invoice_updates =
            Arc::new(InvoiceUpdateService::new(Arc::clone(&repositories.invoices)));
        let line_updates = Arc::new(InvoiceLineUpdateService::new(
            Arc::clone(&repositories.invoice_lines),
            Arc::clone(&repositories.contracts),
            Arc::clone(&repositories.cost_nodes),
            Arc::clone(&repositories.cost_types),
        ));
        let ingest = Arc::new(InvoiceIngestOrchestrator::new(
            Arc::clone(&invoice_updates),
            Arc::clone(&line_updates),
        ));

        Self {
            company_rows: Arc::new(ApplyCompanyExcelBatchService::new(Arc::clone(
                &repositories.companies,
            ))),
            totals: Arc::new(InvoiceTotalsService::new(Arc::clone(&repositories.invoice_lines))),
            evaluator: Arc::new(evaluator),
            invoice_updates,
            line_updates,
            ingest,
            config,
            db,
            repositories,
        }
    }

    pub fn document_ingest(&self) -> InvoiceDocumentIngestService {
        InvoiceDocumentIngestService::new(Arc::clone(&self.evaluator), Arc::clone(&self.ingest))
    }

    pub fn spreadsheet_ingest(&self) -> InvoiceSpreadsheetIngestService {
        InvoiceSpreadsheetIngestService::new(
            Arc::clone(&self.company_rows),
            Arc::clone(&self.evaluator),
            Arc::clone(&self.ingest),
        )
    }

    /// Fresh builder; each contract is created through its own instance.
    pub fn create_contract(&self) -> CreateContractService {
        CreateContractService::new(
            Arc::clone(&self.repositories.contracts),
            Arc::clone(&self.repositories.cost_nodes),
            Arc::clone(&self.repositories.companies),
        )
    }

    pub fn update_contract(&self) -> UpdateContractService {
        UpdateContractService::new(Arc::clone(&self.repositories.contracts))
    }

    pub fn update_structure(&self) -> UpdateContractStructureService {
        UpdateContractStructureService::new(
            Arc::clone(&self.repositories.contracts),
            Arc::clone(&self.repositories.cost_nodes),
        )
    }

    pub fn cost_node_edits(&self) -> ContractCostNodeService {
        ContractCostNodeService::new(Arc::clone(&self.repositories.cost_nodes))
    }

    pub fn cost_types(&self) -> CostTypeService {
        CostTypeService::new(Arc::clone(&self.repositories.cost_types))
    }

    pub fn create_company(&self) -> CreateCompanyService {
        CreateCompanyService::new(Arc::clone(&self.repositories.companies))
    }

    pub fn update_company(&self) -> UpdateCompanyService {
        UpdateCompanyService::new(Arc::clone(&self.repositories.companies))
    }

    pub fn change_company_role(&self) -> ChangeCompanyRoleService {
        ChangeCompanyRoleService::new(Arc::clone(&self.repositories.companies))
    }
}

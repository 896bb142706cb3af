//! Opening a new contract together with its cost tree

use std::sync::Arc;

use costledger_domain::{Contract, ContractStarter, CostNodeInput, LedgerError, Result};
use tracing::info;

use super::ports::ContractRepository;
use crate::companies::CompanyRepository;
use crate::cost_nodes::{BuildOptions, CostNodeEntityValidator, CostNodeRepository, CostNodeTreeBuilder};

/// One contract creation session: `init`, any number of
/// `add_cost_node_tree`, then `execute`.
pub struct CreateContractService {
    contracts: Arc<dyn ContractRepository>,
    cost_nodes: Arc<dyn CostNodeRepository>,
    companies: Arc<dyn CompanyRepository>,
    builder: CostNodeTreeBuilder,
    contract: Option<Contract>,
    items: Vec<CostNodeInput>,
}

impl CreateContractService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        cost_nodes: Arc<dyn CostNodeRepository>,
        companies: Arc<dyn CompanyRepository>,
    ) -> Self {
        Self {
            contracts,
            cost_nodes,
            companies,
            builder: CostNodeTreeBuilder::new(),
            contract: None,
            items: Vec::new(),
        }
    }

    pub fn with_builder(mut self, builder: CostNodeTreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Start a new contract. Owner and client must exist and the code must
    /// be unused.
    pub fn init(&mut self, starter: ContractStarter) -> Result<Contract> {
        let code = starter.code.trim();
        if code.is_empty() {
            return Err(LedgerError::validation("Contract code is required"));
        }
        if self.contracts.get_by_code(code)?.is_some() {
            return Err(LedgerError::Conflict(format!("Contract with code '{code}' already exists")));
        }
        if !self.companies.exists(starter.owner_id)? {
            return Err(LedgerError::NotFound("Contract owner does not exist".into()));
        }
        if !self.companies.exists(starter.client_id)? {
            return Err(LedgerError::NotFound("Contract client does not exist".into()));
        }

        let contract = starter.into_contract();
        self.contract = Some(contract.clone());
        self.items.clear();
        Ok(contract)
    }

    pub fn add_cost_node_tree(&mut self, items: Vec<CostNodeInput>) -> Result<()> {
        if self.contract.is_none() {
            return Err(LedgerError::InvalidInput("Contract not initialized".into()));
        }
        self.items.extend(items);
        Ok(())
    }

    /// Build, validate and persist the contract with its cost tree.
    pub fn execute(&mut self) -> Result<Contract> {
        let contract = self
            .contract
            .take()
            .ok_or_else(|| LedgerError::InvalidInput("Contract not initialized".into()))?;
        let items = std::mem::take(&mut self.items);

        let nodes = self.builder.build(contract.id, &items, &BuildOptions::default())?;
        CostNodeEntityValidator::validate(&nodes)?;

        self.contracts.add(&contract)?;
        self.cost_nodes.add_all(&nodes)?;
        info!(code = %contract.code, nodes = nodes.len(), "contract created");
        Ok(contract)
    }
}

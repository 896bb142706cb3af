//! Whole-tree replacement of a contract's cost structure
//!
//! Without recorded costs the old tree is simply dropped (hard replace).
//! Once costs exist, nodes are matched by code so their ids survive, and a
//! node carrying costs can never be removed (safe replace).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use costledger_domain::{
    Contract, ContractMetadata, CostNode, CostNodeInput, CostNodeRow, LedgerError, Result,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::cost_node_service::is_decrease;
use super::ports::ContractRepository;
use crate::cost_nodes::{
    BuildOptions, CostNodeEntityValidator, CostNodeRepository, CostNodeStructureValidator,
    CostNodeTreeBuilder,
};

/// Full replacement of a contract's metadata and cost tree
#[derive(Debug, Clone)]
pub struct ContractStructureUpdate {
    pub contract_id: Uuid,
    pub metadata: ContractMetadata,
    pub cost_nodes: Vec<CostNodeInput>,
}

impl ContractStructureUpdate {
    pub fn new(contract_id: Uuid, metadata: ContractMetadata, cost_nodes: Vec<CostNodeInput>) -> Self {
        Self { contract_id, metadata, cost_nodes }
    }

    /// Update from flat spreadsheet rows, checked and nested first.
    pub fn from_rows(
        contract_id: Uuid,
        metadata: ContractMetadata,
        rows: &[CostNodeRow],
    ) -> Result<Self> {
        let cost_nodes = CostNodeStructureValidator::into_tree(rows)?;
        Ok(Self::new(contract_id, metadata, cost_nodes))
    }
}

/// Node changes of a safe replace, computed before anything is written
#[derive(Debug, Default)]
struct StructureDiff {
    keep: Vec<CostNode>,
    insert: Vec<CostNode>,
    remove: Vec<CostNode>,
}

pub struct UpdateContractStructureService {
    contracts: Arc<dyn ContractRepository>,
    cost_nodes: Arc<dyn CostNodeRepository>,
    builder: CostNodeTreeBuilder,
}

impl UpdateContractStructureService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        cost_nodes: Arc<dyn CostNodeRepository>,
    ) -> Self {
        Self { contracts, cost_nodes, builder: CostNodeTreeBuilder::new() }
    }

    pub fn with_builder(mut self, builder: CostNodeTreeBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn execute(&self, update: ContractStructureUpdate) -> Result<()> {
        let contract = self
            .contracts
            .get(update.contract_id)?
            .ok_or_else(|| LedgerError::NotFound("Contract does not exist".into()))?;
        let contract = contract.with_metadata(update.metadata);

        if self.cost_nodes.has_costs(contract.id)? {
            self.safe_replace(&contract, &update.cost_nodes)
        } else {
            self.hard_replace(&contract, &update.cost_nodes)
        }
    }

    fn hard_replace(&self, contract: &Contract, items: &[CostNodeInput]) -> Result<()> {
        let nodes = self.builder.build(contract.id, items, &BuildOptions::default())?;
        CostNodeEntityValidator::validate(&nodes)?;

        self.contracts.update(contract)?;
        self.cost_nodes.delete_by_contract(contract.id)?;
        self.cost_nodes.add_all(&nodes)?;

        info!(code = %contract.code, nodes = nodes.len(), "contract structure replaced");
        Ok(())
    }

    fn safe_replace(&self, contract: &Contract, items: &[CostNodeInput]) -> Result<()> {
        let existing = self.cost_nodes.list_by_contract(contract.id)?;
        let options = BuildOptions::default().with_existing_nodes(existing.iter().cloned());

        let nodes = self.builder.build(contract.id, items, &options)?;
        CostNodeEntityValidator::validate(&nodes)?;

        let diff = diff_by_code(existing, nodes);
        for node in &diff.remove {
            if self.cost_nodes.node_has_costs(node.id)? {
                return Err(LedgerError::validation(format!(
                    "cannot remove cost node '{}' – costs already exist",
                    node.code
                )));
            }
        }
        self.warn_on_budget_decreases(contract.id, &diff.keep)?;

        self.contracts.update(contract)?;
        // Inserts go first: kept nodes may move under new parents.
        self.cost_nodes.add_all(&diff.insert)?;
        self.cost_nodes.update_many(&diff.keep)?;
        let removed: Vec<Uuid> = diff.remove.iter().map(|node| node.id).collect();
        self.cost_nodes.delete_many(&removed)?;

        info!(
            code = %contract.code,
            kept = diff.keep.len(),
            inserted = diff.insert.len(),
            removed = removed.len(),
            "contract structure merged"
        );
        Ok(())
    }

    fn warn_on_budget_decreases(&self, contract_id: Uuid, kept: &[CostNode]) -> Result<()> {
        for node in kept {
            let Some(previous) = self.cost_nodes.get(node.id)? else {
                continue;
            };
            if is_decrease(previous.budget.as_ref(), node.budget.as_ref())
                && self.cost_nodes.node_has_costs(node.id)?
            {
                warn!(
                    contract_id = %contract_id,
                    code = %node.code,
                    "budget decreased on a cost node with recorded costs"
                );
            }
        }
        Ok(())
    }
}

fn diff_by_code(existing: Vec<CostNode>, nodes: Vec<CostNode>) -> StructureDiff {
    let new_codes: HashSet<String> = nodes.iter().map(|node| node.code.clone()).collect();
    let existing_by_code: HashMap<String, CostNode> =
        existing.into_iter().map(|node| (node.code.clone(), node)).collect();

    let mut diff = StructureDiff::default();
    for node in nodes {
        if existing_by_code.contains_key(&node.code) {
            diff.keep.push(node);
        } else {
            diff.insert.push(node);
        }
    }
    diff.remove = existing_by_code
        .into_values()
        .filter(|node| !new_codes.contains(&node.code))
        .collect();
    diff.remove.sort_by(|a, b| a.code.cmp(&b.code));
    diff
}

//! Single-node edits on an existing contract tree
//!
//! Every edit is checked against the whole resulting node set before it is
//! written, so a contract never ends up with a broken tree.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use costledger_domain::{CostNode, CostNodeInput, LedgerError, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cost_nodes::{BuildOptions, CostNodeEntityValidator, CostNodeRepository, CostNodeTreeBuilder};

pub struct ContractCostNodeService {
    cost_nodes: Arc<dyn CostNodeRepository>,
    builder: CostNodeTreeBuilder,
}

impl ContractCostNodeService {
    pub fn new(cost_nodes: Arc<dyn CostNodeRepository>) -> Self {
        Self { cost_nodes, builder: CostNodeTreeBuilder::new() }
    }

    /// Attach `item` and its children under the node coded `parent_code`.
    pub fn add_node(
        &self,
        contract_id: Uuid,
        parent_code: &str,
        item: &CostNodeInput,
    ) -> Result<Vec<CostNode>> {
        let mut nodes = self.cost_nodes.list_by_contract(contract_id)?;
        let parent = find_by_code(&nodes, parent_code)?;

        let added =
            self.builder.build_subtree(contract_id, item, Some(parent.id), &BuildOptions::default())?;
        nodes.extend(added.iter().cloned());
        CostNodeEntityValidator::validate(&nodes)?;

        self.cost_nodes.add_all(&added)?;
        info!(code = %item.code, parent = parent_code, "cost node added");
        Ok(added)
    }

    /// Re-parent the node coded `code` under `new_parent_code`.
    pub fn move_node(
        &self,
        contract_id: Uuid,
        code: &str,
        new_parent_code: &str,
    ) -> Result<CostNode> {
        let mut nodes = self.cost_nodes.list_by_contract(contract_id)?;
        let parent_id = find_by_code(&nodes, new_parent_code)?.id;
        let moved = find_by_code(&nodes, code)?.clone().with_parent_id(Some(parent_id));

        replace_node(&mut nodes, &moved);
        CostNodeEntityValidator::validate(&nodes)?;

        self.cost_nodes.update(&moved)?;
        info!(code, parent = new_parent_code, "cost node moved");
        Ok(moved)
    }

    pub fn update_budget(
        &self,
        contract_id: Uuid,
        code: &str,
        budget: Option<BigDecimal>,
    ) -> Result<CostNode> {
        let node = self.get_node(contract_id, code)?;
        if is_decrease(node.budget.as_ref(), budget.as_ref())
            && self.cost_nodes.node_has_costs(node.id)?
        {
            warn!(code, "budget decreased on a cost node with recorded costs");
        }

        let updated = node.with_budget(budget);
        self.cost_nodes.update(&updated)?;
        Ok(updated)
    }

    pub fn disable_node(&self, contract_id: Uuid, code: &str) -> Result<CostNode> {
        let updated = self.get_node(contract_id, code)?.with_active(false);
        self.cost_nodes.update(&updated)?;
        info!(code, "cost node disabled");
        Ok(updated)
    }

    fn get_node(&self, contract_id: Uuid, code: &str) -> Result<CostNode> {
        self.cost_nodes
            .get_by_code(contract_id, code)?
            .ok_or_else(|| LedgerError::NotFound(format!("Cost node '{code}' does not exist")))
    }
}

fn find_by_code<'a>(nodes: &'a [CostNode], code: &str) -> Result<&'a CostNode> {
    nodes
        .iter()
        .find(|node| node.code == code)
        .ok_or_else(|| LedgerError::NotFound(format!("Cost node '{code}' does not exist")))
}

fn replace_node(nodes: &mut [CostNode], updated: &CostNode) {
    if let Some(slot) = nodes.iter_mut().find(|node| node.id == updated.id) {
        *slot = updated.clone();
    }
}

pub(crate) fn is_decrease(old: Option<&BigDecimal>, new: Option<&BigDecimal>) -> bool {
    match (old, new) {
        (Some(old), Some(new)) => new < old,
        (Some(_), None) => true,
        _ => false,
    }
}

//! Builds a flat, single-rooted cost node list from nested input.
//!
//! When the input is not already a single `ROOT` item, a technical root is
//! synthesized above it. Traversal is iterative and depth-bounded so arbitrarily
//! nested sheets cannot exhaust the call stack.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use costledger_domain::constants::{DEFAULT_ROOT_NAME, MAX_COST_NODE_DEPTH, ROOT_CODE};
use costledger_domain::{CostNode, CostNodeInput, LedgerError, Result};
use uuid::Uuid;

/// Optional inputs of [`CostNodeTreeBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Current nodes keyed by code; their ids are reused for matching codes.
    pub existing_nodes: HashMap<String, CostNode>,
    /// Parent of the produced root. `None` for a whole contract tree.
    pub parent_id: Option<Uuid>,
    pub root_code: Option<String>,
    pub root_name: Option<String>,
}

impl BuildOptions {
    pub fn with_existing_nodes(mut self, nodes: impl IntoIterator<Item = CostNode>) -> Self {
        self.existing_nodes = nodes.into_iter().map(|node| (node.code.clone(), node)).collect();
        self
    }

    pub fn with_parent_id(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_root(mut self, code: impl Into<String>, name: impl Into<String>) -> Self {
        self.root_code = Some(code.into());
        self.root_name = Some(name.into());
        self
    }
}

/// Cost node tree builder
#[derive(Debug, Clone)]
pub struct CostNodeTreeBuilder {
    max_depth: usize,
}

impl Default for CostNodeTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CostNodeTreeBuilder {
    pub const fn new() -> Self {
        Self { max_depth: MAX_COST_NODE_DEPTH }
    }

    /// Override the maximum nesting depth (root is depth 0).
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build the full node list for a contract, root first, in pre-order.
    ///
    /// # Errors
    /// Returns [`LedgerError::Validation`] for empty input or input nested
    /// deeper than the configured bound.
    pub fn build(
        &self,
        contract_id: Uuid,
        items: &[CostNodeInput],
        options: &BuildOptions,
    ) -> Result<Vec<CostNode>> {
        if items.is_empty() {
            return Err(LedgerError::validation("At least one cost node root is required"));
        }

        let root_code = options.root_code.as_deref().unwrap_or(ROOT_CODE);

        if let [single] = items {
            if single.code == root_code {
                return self.build_subtree(contract_id, single, options.parent_id, options);
            }
        }

        let root = CostNode {
            id: resolve_id(root_code, options),
            contract_id,
            parent_id: options.parent_id,
            code: root_code.to_string(),
            name: options.root_name.clone().unwrap_or_else(|| DEFAULT_ROOT_NAME.to_string()),
            budget: sum_budgets(items),
            quantity: None,
            unit: None,
            is_active: true,
        };

        let root_id = root.id;
        let mut nodes = vec![root];
        self.flatten_into(&mut nodes, contract_id, items, root_id, 1, options)?;
        Ok(nodes)
    }

    /// Build one node and its descendants under `parent_id`, without
    /// synthesizing a root.
    pub fn build_subtree(
        &self,
        contract_id: Uuid,
        item: &CostNodeInput,
        parent_id: Option<Uuid>,
        options: &BuildOptions,
    ) -> Result<Vec<CostNode>> {
        let top = to_node(contract_id, item, parent_id, options);
        let top_id = top.id;
        let mut nodes = vec![top];
        self.flatten_into(&mut nodes, contract_id, &item.children, top_id, 1, options)?;
        Ok(nodes)
    }

    fn flatten_into(
        &self,
        nodes: &mut Vec<CostNode>,
        contract_id: Uuid,
        children: &[CostNodeInput],
        parent_id: Uuid,
        depth: usize,
        options: &BuildOptions,
    ) -> Result<()> {
        // Reversed pushes keep siblings in input order when popped.
        let mut stack: Vec<(&CostNodeInput, Uuid, usize)> =
            children.iter().rev().map(|child| (child, parent_id, depth)).collect();

        while let Some((item, parent, depth)) = stack.pop() {
            if depth > self.max_depth {
                return Err(LedgerError::validation(format!(
                    "Cost node tree exceeds maximum depth of {} at node '{}'",
                    self.max_depth, item.code
                )));
            }

            let node = to_node(contract_id, item, Some(parent), options);
            let node_id = node.id;
            nodes.push(node);

            stack.extend(item.children.iter().rev().map(|child| (child, node_id, depth + 1)));
        }

        Ok(())
    }
}

fn to_node(
    contract_id: Uuid,
    item: &CostNodeInput,
    parent_id: Option<Uuid>,
    options: &BuildOptions,
) -> CostNode {
    CostNode {
        id: resolve_id(&item.code, options),
        contract_id,
        parent_id,
        code: item.code.clone(),
        name: item.name.clone(),
        budget: item.budget.clone(),
        quantity: item.quantity.clone(),
        unit: item.unit,
        is_active: item.is_active,
    }
}

fn resolve_id(code: &str, options: &BuildOptions) -> Uuid {
    options.existing_nodes.get(code).map_or_else(Uuid::new_v4, |node| node.id)
}

/// Sum of every budget found anywhere in the given subtrees, `None` when no
/// node carries a budget.
fn sum_budgets(items: &[CostNodeInput]) -> Option<BigDecimal> {
    let mut stack: Vec<&CostNodeInput> = items.iter().collect();
    let mut total: Option<BigDecimal> = None;

    while let Some(item) = stack.pop() {
        if let Some(budget) = &item.budget {
            total = Some(total.map_or_else(|| budget.clone(), |sum| sum + budget));
        }
        stack.extend(item.children.iter());
    }

    total
}

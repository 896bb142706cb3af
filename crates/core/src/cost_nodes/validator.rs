//! Invariant checks over a flat cost node set of one contract.
//!
//! Any violation rejects the whole set; callers must not persist a partially
//! valid tree.

use std::collections::{BTreeSet, HashMap, HashSet};

use costledger_domain::constants::ROOT_CODE;
use costledger_domain::{CostNode, LedgerError, Result};
use uuid::Uuid;

/// Cost node entity validator
#[derive(Debug, Clone, Copy, Default)]
pub struct CostNodeEntityValidator;

impl CostNodeEntityValidator {
    /// Validate a node set before it is persisted.
    ///
    /// Checks run in a fixed order: non-empty, single contract, unique codes,
    /// single `ROOT`, parents resolvable, no cycles.
    ///
    /// # Errors
    /// Returns [`LedgerError::Validation`] naming the first broken invariant.
    pub fn validate(nodes: &[CostNode]) -> Result<()> {
        if nodes.is_empty() {
            return Err(LedgerError::validation("No cost nodes provided"));
        }

        validate_single_contract(nodes)?;
        validate_unique_codes(nodes)?;
        validate_single_root(nodes)?;
        validate_parents_exist(nodes)?;
        validate_no_cycles(nodes)
    }
}

fn validate_single_contract(nodes: &[CostNode]) -> Result<()> {
    let contracts: HashSet<Uuid> = nodes.iter().map(|node| node.contract_id).collect();
    if contracts.len() != 1 {
        return Err(LedgerError::validation("Cost nodes belong to multiple contracts"));
    }
    Ok(())
}

fn validate_unique_codes(nodes: &[CostNode]) -> Result<()> {
    let mut seen = HashSet::new();
    let duplicates: BTreeSet<&str> =
        nodes.iter().map(|node| node.code.as_str()).filter(|code| !seen.insert(*code)).collect();

    if !duplicates.is_empty() {
        let listed: Vec<&str> = duplicates.into_iter().collect();
        return Err(LedgerError::validation(format!(
            "Duplicate cost node codes: {}",
            listed.join(", ")
        )));
    }
    Ok(())
}

fn validate_single_root(nodes: &[CostNode]) -> Result<()> {
    let roots: Vec<&CostNode> = nodes.iter().filter(|node| node.is_root()).collect();

    match roots.as_slice() {
        [root] if root.code == ROOT_CODE => Ok(()),
        [_] => Err(LedgerError::validation(format!("Root node must have code='{ROOT_CODE}'"))),
        _ => Err(LedgerError::validation(format!(
            "Exactly one ROOT node required, found {}",
            roots.len()
        ))),
    }
}

fn validate_parents_exist(nodes: &[CostNode]) -> Result<()> {
    let ids: HashSet<Uuid> = nodes.iter().map(|node| node.id).collect();

    for node in nodes {
        let Some(parent_id) = node.parent_id else { continue };

        if !ids.contains(&parent_id) {
            return Err(LedgerError::validation(format!(
                "Parent id '{parent_id}' not found for node '{}'",
                node.code
            )));
        }
        if parent_id == node.id {
            return Err(LedgerError::validation(format!(
                "Node '{}' cannot be its own parent",
                node.code
            )));
        }
    }
    Ok(())
}

fn validate_no_cycles(nodes: &[CostNode]) -> Result<()> {
    let by_id: HashMap<Uuid, &CostNode> = nodes.iter().map(|node| (node.id, node)).collect();
    // Nodes whose ancestor chain is known to end at the root.
    let mut grounded: HashSet<Uuid> = HashSet::new();

    for node in nodes {
        let mut visited = Vec::new();
        let mut current = node;

        loop {
            if grounded.contains(&current.id) {
                break;
            }
            if visited.contains(&current.id) {
                return Err(LedgerError::validation(format!(
                    "Cycle detected starting at node '{}'",
                    node.code
                )));
            }
            visited.push(current.id);

            match current.parent_id.and_then(|parent_id| by_id.get(&parent_id)) {
                Some(&parent) => current = parent,
                None => break,
            }
        }

        grounded.extend(visited);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(contract_id: Uuid, code: &str, parent_id: Option<Uuid>) -> CostNode {
        CostNode {
            id: Uuid::new_v4(),
            contract_id,
            parent_id,
            code: code.to_string(),
            name: code.to_lowercase(),
            budget: None,
            quantity: None,
            unit: None,
            is_active: true,
        }
    }

    fn valid_tree() -> Vec<CostNode> {
        let contract_id = Uuid::new_v4();
        let root = node(contract_id, "ROOT", None);
        let a = node(contract_id, "A", Some(root.id));
        let a1 = node(contract_id, "A.1", Some(a.id));
        vec![root, a, a1]
    }

    fn message(result: Result<()>) -> String {
        match result {
            Err(LedgerError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_tree_passes() {
        assert!(CostNodeEntityValidator::validate(&valid_tree()).is_ok());
    }

    #[test]
    fn empty_set_is_rejected() {
        assert_eq!(message(CostNodeEntityValidator::validate(&[])), "No cost nodes provided");
    }

    #[test]
    fn mixed_contracts_are_rejected() {
        let mut nodes = valid_tree();
        nodes[2].contract_id = Uuid::new_v4();
        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            "Cost nodes belong to multiple contracts"
        );
    }

    #[test]
    fn duplicate_codes_are_listed() {
        let mut nodes = valid_tree();
        nodes[2].code = "A".into();
        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            "Duplicate cost node codes: A"
        );
    }

    #[test]
    fn two_roots_are_rejected() {
        let mut nodes = valid_tree();
        nodes[1].parent_id = None;
        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            "Exactly one ROOT node required, found 2"
        );
    }

    #[test]
    fn root_must_be_coded_root() {
        let mut nodes = valid_tree();
        nodes[0].code = "TOP".into();
        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            "Root node must have code='ROOT'"
        );
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let mut nodes = valid_tree();
        let missing = Uuid::new_v4();
        nodes[2].parent_id = Some(missing);
        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            format!("Parent id '{missing}' not found for node 'A.1'")
        );
    }

    #[test]
    fn self_parent_is_rejected() {
        let mut nodes = valid_tree();
        nodes[2].parent_id = Some(nodes[2].id);
        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            "Node 'A.1' cannot be its own parent"
        );
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let mut nodes = valid_tree();
        let contract_id = nodes[0].contract_id;
        let mut b = node(contract_id, "B", None);
        let c = node(contract_id, "C", Some(b.id));
        b.parent_id = Some(c.id);
        nodes.push(b);
        nodes.push(c);

        assert_eq!(
            message(CostNodeEntityValidator::validate(&nodes)),
            "Cycle detected starting at node 'B'"
        );
    }
}

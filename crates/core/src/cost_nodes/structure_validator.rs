//! Validation of flat structure-sheet rows that reference parents by code,
//! and their conversion into nested [`CostNodeInput`] trees.

use std::collections::{HashMap, HashSet};

use costledger_domain::constants::MAX_COST_NODE_DEPTH;
use costledger_domain::{CostNodeInput, CostNodeRow, LedgerError, Result};

/// Row-level structure validator
#[derive(Debug, Clone, Copy, Default)]
pub struct CostNodeStructureValidator;

impl CostNodeStructureValidator {
    /// # Errors
    /// Returns [`LedgerError::Validation`] for duplicate codes, unknown parent
    /// codes, a root count other than one, a parent cycle, or a row nested
    /// deeper than [`MAX_COST_NODE_DEPTH`].
    pub fn validate(rows: &[CostNodeRow]) -> Result<()> {
        let mut codes = HashSet::new();
        if !rows.iter().all(|row| codes.insert(row.code.as_str())) {
            return Err(LedgerError::validation("Duplicate cost node codes found"));
        }

        for row in rows {
            if let Some(parent) = parent_code(row) {
                if !codes.contains(parent) {
                    return Err(LedgerError::validation(format!(
                        "Parent code '{parent}' does not exist for node '{}'",
                        row.code
                    )));
                }
            }
        }

        let roots = rows.iter().filter(|row| parent_code(row).is_none()).count();
        if roots != 1 {
            return Err(LedgerError::validation("Exactly one root cost node is required"));
        }

        check_ancestry(rows)
    }

    /// Validate rows and nest them under their parents, keeping row order
    /// among siblings.
    pub fn into_tree(rows: &[CostNodeRow]) -> Result<Vec<CostNodeInput>> {
        Self::validate(rows)?;

        let mut children: HashMap<&str, Vec<&CostNodeRow>> = HashMap::new();
        let mut roots = Vec::new();
        for row in rows {
            match parent_code(row) {
                Some(parent) => children.entry(parent).or_default().push(row),
                None => roots.push(row),
            }
        }

        // Post-order: a node is assembled once all of its children are.
        let mut built: HashMap<&str, CostNodeInput> = HashMap::with_capacity(rows.len());
        let mut stack: Vec<(&CostNodeRow, bool)> = roots.iter().map(|row| (*row, false)).collect();
        while let Some((row, expanded)) = stack.pop() {
            let kids = children.get(row.code.as_str());
            if !expanded {
                stack.push((row, true));
                stack.extend(kids.into_iter().flatten().map(|child| (*child, false)));
                continue;
            }

            let mut input = CostNodeInput::new(row.code.clone(), row.name.clone());
            input.budget = row.budget.clone();
            input.children = kids
                .into_iter()
                .flatten()
                .filter_map(|child| built.remove(child.code.as_str()))
                .collect();
            built.insert(row.code.as_str(), input);
        }

        Ok(roots.into_iter().filter_map(|row| built.remove(row.code.as_str())).collect())
    }
}

fn parent_code(row: &CostNodeRow) -> Option<&str> {
    row.parent_code.as_deref().map(str::trim).filter(|code| !code.is_empty())
}

/// Reject parent cycles and over-deep rows. Each row's depth is computed once
/// and reused by its descendants.
fn check_ancestry(rows: &[CostNodeRow]) -> Result<()> {
    let parents: HashMap<&str, Option<&str>> =
        rows.iter().map(|row| (row.code.as_str(), parent_code(row))).collect();
    let mut depths: HashMap<&str, usize> = HashMap::with_capacity(rows.len());

    for row in rows {
        let mut path: Vec<&str> = Vec::new();
        let mut on_path: HashSet<&str> = HashSet::new();
        let mut current = row.code.as_str();

        let mut depth = loop {
            if let Some(known) = depths.get(current) {
                break known + 1;
            }
            if !on_path.insert(current) {
                return Err(LedgerError::validation(format!(
                    "Cycle detected at node '{}'",
                    row.code
                )));
            }
            path.push(current);
            if path.len() > MAX_COST_NODE_DEPTH + 1 {
                return Err(too_deep(&row.code));
            }
            match parents.get(current).copied().flatten() {
                Some(parent) => current = parent,
                None => break 0,
            }
        };

        for code in path.into_iter().rev() {
            if depth > MAX_COST_NODE_DEPTH {
                return Err(too_deep(code));
            }
            depths.insert(code, depth);
            depth += 1;
        }
    }
    Ok(())
}

fn too_deep(code: &str) -> LedgerError {
    LedgerError::validation(format!(
        "Cost node tree exceeds maximum depth of {MAX_COST_NODE_DEPTH} at node '{code}'"
    ))
}

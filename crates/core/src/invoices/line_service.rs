//! Invoice line application and assignment
//!
//! Lines reference their invoice by number through the batch's ref map and
//! their assignment by contract / cost node / cost type code. The batch is
//! the full truth for each invoice it touches: lines missing from it are
//! deleted afterwards.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use costledger_domain::{InvoiceLine, LedgerError, Result};
use indexmap::IndexMap;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{InvoiceApplyAction, InvoiceLineUpdate, InvoiceRefResult};
use super::ports::InvoiceLineRepository;
use crate::contracts::ContractRepository;
use crate::cost_nodes::CostNodeRepository;
use crate::cost_types::CostTypeRepository;

/// Contract, cost node and cost type ids of one line
#[derive(Debug, Clone, Copy, Default)]
struct Assignment {
    contract_id: Option<Uuid>,
    cost_node_id: Option<Uuid>,
    cost_type_id: Option<Uuid>,
}

pub struct InvoiceLineUpdateService {
    lines: Arc<dyn InvoiceLineRepository>,
    contracts: Arc<dyn ContractRepository>,
    cost_nodes: Arc<dyn CostNodeRepository>,
    cost_types: Arc<dyn CostTypeRepository>,
}

impl InvoiceLineUpdateService {
    pub fn new(
        lines: Arc<dyn InvoiceLineRepository>,
        contracts: Arc<dyn ContractRepository>,
        cost_nodes: Arc<dyn CostNodeRepository>,
        cost_types: Arc<dyn CostTypeRepository>,
    ) -> Self {
        Self { lines, contracts, cost_nodes, cost_types }
    }

    /// Write `updates` and return the invoices whose lines are all fully
    /// assigned.
    ///
    /// # Errors
    /// An unknown assignment code or line id fails the batch.
    pub fn apply(
        &self,
        updates: &[InvoiceLineUpdate],
        refs: &IndexMap<String, InvoiceRefResult>,
    ) -> Result<BTreeSet<Uuid>> {
        let mut completeness: IndexMap<Uuid, bool> = IndexMap::new();
        let mut touched: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();

        for update in updates {
            let invoice_id = match update.invoice_number.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(number) => match refs.get(number) {
                    None => {
                        warn!(
                            invoice_number = number,
                            item = %update.item_name,
                            "invoice reference not in batch, line skipped"
                        );
                        continue;
                    }
                    Some(reference) if reference.action.skips_lines() => {
                        info!(invoice_number = number, action = %reference.action, "invoice lines skipped");
                        continue;
                    }
                    Some(reference) => reference.invoice_id,
                },
            };

            let assignment = self.resolve_assignment(update)?;
            let line_id = match update.invoice_line_id {
                Some(line_id) => self.update_line(line_id, update, invoice_id, assignment)?,
                None => self.create_line(update, invoice_id, assignment)?,
            };

            if let Some(invoice_id) = invoice_id {
                touched.entry(invoice_id).or_default().insert(line_id);
                let complete = completeness.entry(invoice_id).or_insert(true);
                *complete = *complete && update.is_complete();
            }
        }

        self.delete_missing_lines(refs, &touched)?;

        let fully_assigned: BTreeSet<Uuid> = completeness
            .into_iter()
            .filter_map(|(invoice_id, complete)| complete.then_some(invoice_id))
            .collect();
        info!(
            lines = updates.len(),
            invoices = touched.len(),
            fully_assigned = fully_assigned.len(),
            "invoice lines applied"
        );
        Ok(fully_assigned)
    }

    fn resolve_assignment(&self, update: &InvoiceLineUpdate) -> Result<Assignment> {
        let contract_id = match non_blank(update.contract_code.as_deref()) {
            Some(code) => Some(
                self.contracts.get_by_code(code)?.ok_or_else(|| unresolved("Contract", code))?.id,
            ),
            None => None,
        };

        let cost_node_id = match (non_blank(update.cost_node_code.as_deref()), contract_id) {
            (Some(code), Some(contract_id)) => Some(
                self.cost_nodes
                    .get_by_code(contract_id, code)?
                    .ok_or_else(|| unresolved("CostNode", code))?
                    .id,
            ),
            (Some(code), None) => return Err(unresolved("CostNode", code)),
            (None, _) => None,
        };

        let cost_type_id = match non_blank(update.cost_type_code.as_deref()) {
            Some(code) => Some(
                self.cost_types.get_by_code(code)?.ok_or_else(|| unresolved("CostType", code))?.id,
            ),
            None => None,
        };

        Ok(Assignment { contract_id, cost_node_id, cost_type_id })
    }

    fn create_line(
        &self,
        update: &InvoiceLineUpdate,
        invoice_id: Option<Uuid>,
        assignment: Assignment,
    ) -> Result<Uuid> {
        let line = InvoiceLine {
            id: Uuid::new_v4(),
            invoice_id,
            contract_id: assignment.contract_id,
            cost_node_id: assignment.cost_node_id,
            cost_type_id: assignment.cost_type_id,
            item_name: update.item_name.clone(),
            description: update.description.clone(),
            quantity: update.quantity.clone(),
            unit: update.unit,
            amount: update.amount.clone(),
        };
        self.lines.add(&line)?;
        Ok(line.id)
    }

    fn update_line(
        &self,
        line_id: Uuid,
        update: &InvoiceLineUpdate,
        invoice_id: Option<Uuid>,
        assignment: Assignment,
    ) -> Result<Uuid> {
        let line = self
            .lines
            .get(line_id)?
            .ok_or_else(|| LedgerError::NotFound("Invoice line not found".into()))?;

        let updated = InvoiceLine {
            item_name: update.item_name.clone(),
            description: update.description.clone(),
            quantity: update.quantity.clone(),
            unit: update.unit,
            amount: update.amount.clone(),
            ..line
        }
        .with_invoice_id(invoice_id)
        .with_assignment(assignment.contract_id, assignment.cost_node_id, assignment.cost_type_id);

        self.lines.update(&updated)?;
        Ok(line_id)
    }

    /// Destructive sync of every applied invoice in the batch.
    fn delete_missing_lines(
        &self,
        refs: &IndexMap<String, InvoiceRefResult>,
        touched: &HashMap<Uuid, BTreeSet<Uuid>>,
    ) -> Result<()> {
        let empty = BTreeSet::new();
        for reference in refs.values() {
            let Some(invoice_id) = reference.invoice_id else {
                continue;
            };
            // Finalized invoices keep their lines; deleted ones lose all of them.
            if reference.action == InvoiceApplyAction::Skipped {
                continue;
            }

            let keep = touched.get(&invoice_id).unwrap_or(&empty);
            let deleted = self.lines.delete_not_in_ids(invoice_id, keep)?;
            if keep.is_empty() {
                warn!(invoice_id = %invoice_id, deleted, "all lines removed from invoice");
            } else if deleted > 0 {
                info!(invoice_id = %invoice_id, deleted, "stale invoice lines removed");
            }
        }
        Ok(())
    }
}

fn non_blank(code: Option<&str>) -> Option<&str> {
    code.map(str::trim).filter(|code| !code.is_empty())
}

fn unresolved(label: &str, code: &str) -> LedgerError {
    LedgerError::NotFound(format!("{label} not found for code: {code}"))
}

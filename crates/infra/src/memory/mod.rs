//! In-memory ledger store
//!
//! One shared store implements every repository port, so cross-entity
//! queries see each other's writes the same way the SQLite tables do. The
//! uniqueness rules of the schema are enforced on insert and update.

use std::collections::BTreeSet;
use std::sync::Arc;

use costledger_core::{
    CompanyRepository, ContractRepository, CostNodeRepository, CostTypeRepository,
    InvoiceLineRepository, InvoiceRepository,
};
use costledger_domain::{
    Company, CompanyRole, Contract, ContractStatus, CostNode, CostType, Invoice, InvoiceLine,
    InvoiceStatus, LedgerError, Result,
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use uuid::Uuid;

type Table<T> = IndexMap<Uuid, T>;

#[derive(Default)]
struct LedgerTables {
    companies: Table<Company>,
    contracts: Table<Contract>,
    cost_nodes: Table<CostNode>,
    cost_types: Table<CostType>,
    invoices: Table<Invoice>,
    lines: Table<InvoiceLine>,
}

/// Shared in-memory implementation of all ledger repositories.
#[derive(Default, Clone)]
pub struct MemoryLedgerStore {
    tables: Arc<RwLock<LedgerTables>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(what: &str, key: &str) -> LedgerError {
    LedgerError::Conflict(format!("unique constraint violation: {what} {key}"))
}

fn insert<T: Clone>(table: &mut Table<T>, id: Uuid, item: &T) -> Result<()> {
    if table.contains_key(&id) {
        return Err(unique_violation("id", &id.to_string()));
    }
    table.insert(id, item.clone());
    Ok(())
}

fn replace<T: Clone>(table: &mut Table<T>, id: Uuid, item: &T) -> Result<()> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = item.clone();
            Ok(())
        }
        None => Err(LedgerError::not_found(format!("no entity with id {id}"))),
    }
}

/// Fails when another row (not `id`) already matches `clashes`.
fn ensure_unique<T>(
    table: &Table<T>,
    id: Uuid,
    what: &str,
    key: &str,
    clashes: impl Fn(&T) -> bool,
) -> Result<()> {
    if table.iter().any(|(other, item)| *other != id && clashes(item)) {
        return Err(unique_violation(what, key));
    }
    Ok(())
}

fn select<T: Clone>(table: &Table<T>, filter: impl Fn(&T) -> bool) -> Vec<T> {
    table.values().filter(|item| filter(item)).cloned().collect()
}

impl LedgerTables {
    fn check_company(&self, company: &Company) -> Result<()> {
        ensure_unique(&self.companies, company.id, "tax_number", &company.tax_number, |c| {
            c.tax_number == company.tax_number
        })
    }

    fn check_contract(&self, contract: &Contract) -> Result<()> {
        ensure_unique(&self.contracts, contract.id, "contract code", &contract.code, |c| {
            c.code == contract.code
        })
    }

    fn check_cost_node(&self, node: &CostNode) -> Result<()> {
        ensure_unique(&self.cost_nodes, node.id, "cost node code", &node.code, |n| {
            n.contract_id == node.contract_id && n.code == node.code
        })
    }

    fn check_cost_type(&self, cost_type: &CostType) -> Result<()> {
        ensure_unique(&self.cost_types, cost_type.id, "cost type code", &cost_type.code, |t| {
            t.code == cost_type.code
        })
    }

    fn check_invoice(&self, invoice: &Invoice) -> Result<()> {
        ensure_unique(&self.invoices, invoice.id, "invoice number", &invoice.invoice_number, |i| {
            i.invoice_number == invoice.invoice_number && i.seller_id == invoice.seller_id
        })
    }
}

impl CompanyRepository for MemoryLedgerStore {
    fn add(&self, company: &Company) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_company(company)?;
        insert(&mut tables.companies, company.id, company)
    }

    fn update(&self, company: &Company) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_company(company)?;
        replace(&mut tables.companies, company.id, company)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        self.tables.write().companies.shift_remove(&id);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Company>> {
        Ok(self.tables.read().companies.get(&id).cloned())
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.read().companies.contains_key(&id))
    }

    fn list_all(&self) -> Result<Vec<Company>> {
        Ok(select(&self.tables.read().companies, |_| true))
    }

    fn get_by_tax_number(&self, tax_number: &str) -> Result<Option<Company>> {
        Ok(self.tables.read().companies.values().find(|c| c.tax_number == tax_number).cloned())
    }

    fn get_owners(&self) -> Result<Vec<Company>> {
        Ok(select(&self.tables.read().companies, |c| c.role == CompanyRole::Own))
    }

    fn exists_owner(&self) -> Result<bool> {
        Ok(self.tables.read().companies.values().any(|c| c.role == CompanyRole::Own))
    }

    fn find_by_bank_account(&self, number: &str) -> Result<Vec<Company>> {
        Ok(select(&self.tables.read().companies, |c| {
            c.bank_account.as_ref().is_some_and(|account| account.number == number)
        }))
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<Company>> {
        Ok(select(&self.tables.read().companies, |c| c.email() == Some(email)))
    }

    fn find_by_phone(&self, phone: &str) -> Result<Vec<Company>> {
        Ok(select(&self.tables.read().companies, |c| c.phone_number() == Some(phone)))
    }

    fn find_by_name_like(&self, fragment: &str) -> Result<Vec<Company>> {
        let fragment = fragment.to_uppercase();
        Ok(select(&self.tables.read().companies, |c| c.name.to_uppercase().contains(&fragment)))
    }

    fn find_by_street_tokens(&self, tokens: &[String]) -> Result<Vec<Company>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let tokens: Vec<String> = tokens.iter().map(|token| token.to_uppercase()).collect();
        Ok(select(&self.tables.read().companies, |c| {
            let street = c.street().unwrap_or_default().to_uppercase();
            tokens.iter().all(|token| street.contains(token.as_str()))
        }))
    }
}

impl ContractRepository for MemoryLedgerStore {
    fn add(&self, contract: &Contract) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_contract(contract)?;
        insert(&mut tables.contracts, contract.id, contract)
    }

    fn get(&self, id: Uuid) -> Result<Option<Contract>> {
        Ok(self.tables.read().contracts.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Contract>> {
        Ok(select(&self.tables.read().contracts, |_| true))
    }

    fn update(&self, contract: &Contract) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_contract(contract)?;
        replace(&mut tables.contracts, contract.id, contract)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.read().contracts.contains_key(&id))
    }

    fn get_by_code(&self, code: &str) -> Result<Option<Contract>> {
        Ok(self.tables.read().contracts.values().find(|c| c.code == code).cloned())
    }
}

impl CostNodeRepository for MemoryLedgerStore {
    fn add(&self, node: &CostNode) -> Result<()> {
        self.add_all(std::slice::from_ref(node))
    }

    fn add_all(&self, nodes: &[CostNode]) -> Result<()> {
        let mut tables = self.tables.write();
        let mut staged = tables.cost_nodes.clone();
        for node in nodes {
            ensure_unique(&staged, node.id, "cost node code", &node.code, |n| {
                n.contract_id == node.contract_id && n.code == node.code
            })?;
            insert(&mut staged, node.id, node)?;
        }
        tables.cost_nodes = staged;
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<CostNode>> {
        Ok(self.tables.read().cost_nodes.get(&id).cloned())
    }

    fn get_by_code(&self, contract_id: Uuid, code: &str) -> Result<Option<CostNode>> {
        Ok(self
            .tables
            .read()
            .cost_nodes
            .values()
            .find(|n| n.contract_id == contract_id && n.code == code)
            .cloned())
    }

    fn list_nodes(&self) -> Result<Vec<CostNode>> {
        Ok(select(&self.tables.read().cost_nodes, |_| true))
    }

    fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<CostNode>> {
        Ok(select(&self.tables.read().cost_nodes, |n| n.parent_id == Some(parent_id)))
    }

    fn list_by_contract(&self, contract_id: Uuid) -> Result<Vec<CostNode>> {
        Ok(select(&self.tables.read().cost_nodes, |n| n.contract_id == contract_id))
    }

    fn update(&self, node: &CostNode) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_cost_node(node)?;
        replace(&mut tables.cost_nodes, node.id, node)
    }

    fn update_many(&self, nodes: &[CostNode]) -> Result<()> {
        let mut tables = self.tables.write();
        let mut staged = tables.cost_nodes.clone();
        for node in nodes {
            replace(&mut staged, node.id, node)?;
        }
        for node in nodes {
            ensure_unique(&staged, node.id, "cost node code", &node.code, |n| {
                n.contract_id == node.contract_id && n.code == node.code
            })?;
        }
        tables.cost_nodes = staged;
        Ok(())
    }

    fn delete_by_contract(&self, contract_id: Uuid) -> Result<()> {
        self.tables.write().cost_nodes.retain(|_, n| n.contract_id != contract_id);
        Ok(())
    }

    fn delete_many(&self, ids: &[Uuid]) -> Result<()> {
        self.tables.write().cost_nodes.retain(|id, _| !ids.contains(id));
        Ok(())
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.read().cost_nodes.contains_key(&id))
    }

    fn has_costs(&self, contract_id: Uuid) -> Result<bool> {
        Ok(self.tables.read().lines.values().any(|l| l.contract_id == Some(contract_id)))
    }

    fn node_has_costs(&self, node_id: Uuid) -> Result<bool> {
        Ok(self.tables.read().lines.values().any(|l| l.cost_node_id == Some(node_id)))
    }

    fn list_leaf_nodes_for_active_contracts(&self) -> Result<Vec<CostNode>> {
        let tables = self.tables.read();
        let parents: BTreeSet<Uuid> =
            tables.cost_nodes.values().filter_map(|n| n.parent_id).collect();

        Ok(select(&tables.cost_nodes, |n| {
            n.is_active
                && !parents.contains(&n.id)
                && tables
                    .contracts
                    .get(&n.contract_id)
                    .is_some_and(|c| c.status == ContractStatus::Active)
        }))
    }
}

impl CostTypeRepository for MemoryLedgerStore {
    fn add(&self, cost_type: &CostType) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_cost_type(cost_type)?;
        insert(&mut tables.cost_types, cost_type.id, cost_type)
    }

    fn get(&self, id: Uuid) -> Result<Option<CostType>> {
        Ok(self.tables.read().cost_types.get(&id).cloned())
    }

    fn get_by_code(&self, code: &str) -> Result<Option<CostType>> {
        Ok(self.tables.read().cost_types.values().find(|t| t.code == code).cloned())
    }

    fn list(&self) -> Result<Vec<CostType>> {
        let mut cost_types = select(&self.tables.read().cost_types, |_| true);
        cost_types.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(cost_types)
    }

    fn update(&self, cost_type: &CostType) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_cost_type(cost_type)?;
        replace(&mut tables.cost_types, cost_type.id, cost_type)
    }

    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.read().cost_types.contains_key(&id))
    }
}

impl InvoiceRepository for MemoryLedgerStore {
    fn add(&self, invoice: &Invoice) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_invoice(invoice)?;
        insert(&mut tables.invoices, invoice.id, invoice)
    }

    fn get(&self, id: Uuid) -> Result<Option<Invoice>> {
        Ok(self.tables.read().invoices.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Invoice>> {
        Ok(select(&self.tables.read().invoices, |_| true))
    }

    fn update(&self, invoice: &Invoice) -> Result<()> {
        let mut tables = self.tables.write();
        tables.check_invoice(invoice)?;
        replace(&mut tables.invoices, invoice.id, invoice)
    }

    fn get_unique_invoice(&self, invoice_number: &str, seller_id: Uuid) -> Result<Option<Invoice>> {
        Ok(self
            .tables
            .read()
            .invoices
            .values()
            .find(|i| i.invoice_number == invoice_number && i.seller_id == seller_id)
            .cloned())
    }

    fn get_for_assignment(&self, statuses: &[InvoiceStatus]) -> Result<Vec<Invoice>> {
        Ok(select(&self.tables.read().invoices, |i| statuses.contains(&i.status)))
    }
}

impl InvoiceLineRepository for MemoryLedgerStore {
    fn add(&self, line: &InvoiceLine) -> Result<()> {
        insert(&mut self.tables.write().lines, line.id, line)
    }

    fn get(&self, id: Uuid) -> Result<Option<InvoiceLine>> {
        Ok(self.tables.read().lines.get(&id).cloned())
    }

    fn update(&self, line: &InvoiceLine) -> Result<()> {
        replace(&mut self.tables.write().lines, line.id, line)
    }

    fn list_by_invoice(&self, invoice_id: Uuid) -> Result<Vec<InvoiceLine>> {
        Ok(select(&self.tables.read().lines, |l| l.invoice_id == Some(invoice_id)))
    }

    fn list_by_invoice_ids(&self, invoice_ids: &[Uuid]) -> Result<Vec<InvoiceLine>> {
        Ok(select(&self.tables.read().lines, |l| {
            l.invoice_id.is_some_and(|id| invoice_ids.contains(&id))
        }))
    }

    fn list_by_null_invoice(&self) -> Result<Vec<InvoiceLine>> {
        Ok(select(&self.tables.read().lines, |l| l.invoice_id.is_none()))
    }

    fn get_for_assignment(&self) -> Result<Vec<InvoiceLine>> {
        Ok(select(&self.tables.read().lines, |l| !l.is_fully_assigned()))
    }

    fn delete_not_in_ids(&self, invoice_id: Uuid, keep_ids: &BTreeSet<Uuid>) -> Result<usize> {
        let mut tables = self.tables.write();
        let before = tables.lines.len();
        tables.lines.retain(|id, l| l.invoice_id != Some(invoice_id) || keep_ids.contains(id));
        Ok(before - tables.lines.len())
    }
}

//! Mock repository implementations for testing
//!
//! `MockLedger` keeps every entity in one store so cross-entity queries such
//! as `has_costs` see the invoice lines written by other services.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use costledger_core::companies::ports::{CompanyArbiter, CompanyRepository};
use costledger_core::contracts::ports::ContractRepository;
use costledger_core::cost_nodes::ports::CostNodeRepository;
use costledger_core::cost_types::ports::CostTypeRepository;
use costledger_core::invoices::ports::{InvoiceLineRepository, InvoiceRepository};
use costledger_domain::{
    Company, CompanyInput, CompanyRole, Contract, ContractStatus, CostNode, CostType, Invoice,
    InvoiceLine, InvoiceStatus, LedgerError, Result as DomainResult,
};
use uuid::Uuid;

#[derive(Default)]
struct LedgerState {
    companies: Vec<Company>,
    contracts: Vec<Contract>,
    cost_nodes: Vec<CostNode>,
    cost_types: Vec<CostType>,
    invoices: Vec<Invoice>,
    lines: Vec<InvoiceLine>,
    company_updates: usize,
    node_deletes: usize,
}

/// In-memory mock for every repository port.
#[derive(Default, Clone)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MockLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn companies(&self) -> Vec<Company> {
        self.state.lock().unwrap().companies.clone()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.state.lock().unwrap().invoices.clone()
    }

    pub fn lines(&self) -> Vec<InvoiceLine> {
        self.state.lock().unwrap().lines.clone()
    }

    pub fn nodes_of(&self, contract_id: Uuid) -> Vec<CostNode> {
        self.state
            .lock()
            .unwrap()
            .cost_nodes
            .iter()
            .filter(|node| node.contract_id == contract_id)
            .cloned()
            .collect()
    }

    /// Number of `CompanyRepository::update` calls so far.
    pub fn company_updates(&self) -> usize {
        self.state.lock().unwrap().company_updates
    }

    /// Number of cost node delete calls so far.
    pub fn node_deletes(&self) -> usize {
        self.state.lock().unwrap().node_deletes
    }
}

fn replace_by_id<T>(items: &mut [T], item: &T, id_of: impl Fn(&T) -> Uuid) -> DomainResult<()>
where
    T: Clone,
{
    let id = id_of(item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(slot) => {
            *slot = item.clone();
            Ok(())
        }
        None => Err(LedgerError::not_found(format!("no entity with id {id}"))),
    }
}

impl CompanyRepository for MockLedger {
    fn add(&self, company: &Company) -> DomainResult<()> {
        self.state.lock().unwrap().companies.push(company.clone());
        Ok(())
    }

    fn update(&self, company: &Company) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.company_updates += 1;
        replace_by_id(&mut state.companies, company, |c| c.id)
    }

    fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.state.lock().unwrap().companies.retain(|c| c.id != id);
        Ok(())
    }

    fn get(&self, id: Uuid) -> DomainResult<Option<Company>> {
        Ok(self.state.lock().unwrap().companies.iter().find(|c| c.id == id).cloned())
    }

    fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().companies.iter().any(|c| c.id == id))
    }

    fn list_all(&self) -> DomainResult<Vec<Company>> {
        Ok(self.companies())
    }

    fn get_by_tax_number(&self, tax_number: &str) -> DomainResult<Option<Company>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .companies
            .iter()
            .find(|c| c.tax_number == tax_number)
            .cloned())
    }

    fn get_owners(&self) -> DomainResult<Vec<Company>> {
        Ok(self.companies().into_iter().filter(|c| c.role == CompanyRole::Own).collect())
    }

    fn exists_owner(&self) -> DomainResult<bool> {
        Ok(!self.get_owners()?.is_empty())
    }

    fn find_by_bank_account(&self, number: &str) -> DomainResult<Vec<Company>> {
        Ok(self
            .companies()
            .into_iter()
            .filter(|c| c.bank_account.as_ref().is_some_and(|b| b.number == number))
            .collect())
    }

    fn find_by_email(&self, email: &str) -> DomainResult<Vec<Company>> {
        Ok(self.companies().into_iter().filter(|c| c.email() == Some(email)).collect())
    }

    fn find_by_phone(&self, phone: &str) -> DomainResult<Vec<Company>> {
        Ok(self.companies().into_iter().filter(|c| c.phone_number() == Some(phone)).collect())
    }

    fn find_by_name_like(&self, fragment: &str) -> DomainResult<Vec<Company>> {
        let fragment = fragment.to_uppercase();
        Ok(self
            .companies()
            .into_iter()
            .filter(|c| c.name.to_uppercase().contains(&fragment))
            .collect())
    }

    fn find_by_street_tokens(&self, tokens: &[String]) -> DomainResult<Vec<Company>> {
        Ok(self
            .companies()
            .into_iter()
            .filter(|c| {
                let street = c.street().unwrap_or_default().to_uppercase();
                tokens.iter().all(|token| street.contains(&token.to_uppercase()))
            })
            .collect())
    }
}

impl ContractRepository for MockLedger {
    fn add(&self, contract: &Contract) -> DomainResult<()> {
        self.state.lock().unwrap().contracts.push(contract.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> DomainResult<Option<Contract>> {
        Ok(self.state.lock().unwrap().contracts.iter().find(|c| c.id == id).cloned())
    }

    fn list(&self) -> DomainResult<Vec<Contract>> {
        Ok(self.state.lock().unwrap().contracts.clone())
    }

    fn update(&self, contract: &Contract) -> DomainResult<()> {
        replace_by_id(&mut self.state.lock().unwrap().contracts, contract, |c| c.id)
    }

    fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().contracts.iter().any(|c| c.id == id))
    }

    fn get_by_code(&self, code: &str) -> DomainResult<Option<Contract>> {
        Ok(self.state.lock().unwrap().contracts.iter().find(|c| c.code == code).cloned())
    }
}

impl CostNodeRepository for MockLedger {
    fn add(&self, node: &CostNode) -> DomainResult<()> {
        self.state.lock().unwrap().cost_nodes.push(node.clone());
        Ok(())
    }

    fn add_all(&self, nodes: &[CostNode]) -> DomainResult<()> {
        self.state.lock().unwrap().cost_nodes.extend_from_slice(nodes);
        Ok(())
    }

    fn get(&self, id: Uuid) -> DomainResult<Option<CostNode>> {
        Ok(self.state.lock().unwrap().cost_nodes.iter().find(|n| n.id == id).cloned())
    }

    fn get_by_code(&self, contract_id: Uuid, code: &str) -> DomainResult<Option<CostNode>> {
        Ok(self.nodes_of(contract_id).into_iter().find(|n| n.code == code))
    }

    fn list_nodes(&self) -> DomainResult<Vec<CostNode>> {
        Ok(self.state.lock().unwrap().cost_nodes.clone())
    }

    fn list_by_parent(&self, parent_id: Uuid) -> DomainResult<Vec<CostNode>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .cost_nodes
            .iter()
            .filter(|n| n.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    fn list_by_contract(&self, contract_id: Uuid) -> DomainResult<Vec<CostNode>> {
        Ok(self.nodes_of(contract_id))
    }

    fn update(&self, node: &CostNode) -> DomainResult<()> {
        replace_by_id(&mut self.state.lock().unwrap().cost_nodes, node, |n| n.id)
    }

    fn update_many(&self, nodes: &[CostNode]) -> DomainResult<()> {
        nodes.iter().try_for_each(|node| CostNodeRepository::update(self, node))
    }

    fn delete_by_contract(&self, contract_id: Uuid) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        state.node_deletes += 1;
        state.cost_nodes.retain(|n| n.contract_id != contract_id);
        Ok(())
    }

    fn delete_many(&self, ids: &[Uuid]) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        if !ids.is_empty() {
            state.node_deletes += 1;
        }
        state.cost_nodes.retain(|n| !ids.contains(&n.id));
        Ok(())
    }

    fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().cost_nodes.iter().any(|n| n.id == id))
    }

    fn has_costs(&self, contract_id: Uuid) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().lines.iter().any(|l| l.contract_id == Some(contract_id)))
    }

    fn node_has_costs(&self, node_id: Uuid) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().lines.iter().any(|l| l.cost_node_id == Some(node_id)))
    }

    fn list_leaf_nodes_for_active_contracts(&self) -> DomainResult<Vec<CostNode>> {
        let state = self.state.lock().unwrap();
        let active: BTreeSet<Uuid> = state
            .contracts
            .iter()
            .filter(|c| c.status == ContractStatus::Active)
            .map(|c| c.id)
            .collect();
        Ok(state
            .cost_nodes
            .iter()
            .filter(|n| n.is_active && active.contains(&n.contract_id))
            .filter(|n| !state.cost_nodes.iter().any(|child| child.parent_id == Some(n.id)))
            .cloned()
            .collect())
    }
}

impl CostTypeRepository for MockLedger {
    fn add(&self, cost_type: &CostType) -> DomainResult<()> {
        self.state.lock().unwrap().cost_types.push(cost_type.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> DomainResult<Option<CostType>> {
        Ok(self.state.lock().unwrap().cost_types.iter().find(|t| t.id == id).cloned())
    }

    fn get_by_code(&self, code: &str) -> DomainResult<Option<CostType>> {
        Ok(self.state.lock().unwrap().cost_types.iter().find(|t| t.code == code).cloned())
    }

    fn list(&self) -> DomainResult<Vec<CostType>> {
        Ok(self.state.lock().unwrap().cost_types.clone())
    }

    fn update(&self, cost_type: &CostType) -> DomainResult<()> {
        replace_by_id(&mut self.state.lock().unwrap().cost_types, cost_type, |t| t.id)
    }

    fn exists(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.state.lock().unwrap().cost_types.iter().any(|t| t.id == id))
    }
}

impl InvoiceRepository for MockLedger {
    fn add(&self, invoice: &Invoice) -> DomainResult<()> {
        self.state.lock().unwrap().invoices.push(invoice.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> DomainResult<Option<Invoice>> {
        Ok(self.state.lock().unwrap().invoices.iter().find(|i| i.id == id).cloned())
    }

    fn list(&self) -> DomainResult<Vec<Invoice>> {
        Ok(self.invoices())
    }

    fn update(&self, invoice: &Invoice) -> DomainResult<()> {
        replace_by_id(&mut self.state.lock().unwrap().invoices, invoice, |i| i.id)
    }

    fn get_unique_invoice(
        &self,
        invoice_number: &str,
        seller_id: Uuid,
    ) -> DomainResult<Option<Invoice>> {
        Ok(self
            .invoices()
            .into_iter()
            .find(|i| i.invoice_number == invoice_number && i.seller_id == seller_id))
    }

    fn get_for_assignment(&self, statuses: &[InvoiceStatus]) -> DomainResult<Vec<Invoice>> {
        Ok(self.invoices().into_iter().filter(|i| statuses.contains(&i.status)).collect())
    }
}

impl InvoiceLineRepository for MockLedger {
    fn add(&self, line: &InvoiceLine) -> DomainResult<()> {
        self.state.lock().unwrap().lines.push(line.clone());
        Ok(())
    }

    fn get(&self, id: Uuid) -> DomainResult<Option<InvoiceLine>> {
        Ok(self.lines().into_iter().find(|l| l.id == id))
    }

    fn update(&self, line: &InvoiceLine) -> DomainResult<()> {
        replace_by_id(&mut self.state.lock().unwrap().lines, line, |l| l.id)
    }

    fn list_by_invoice(&self, invoice_id: Uuid) -> DomainResult<Vec<InvoiceLine>> {
        Ok(self.lines().into_iter().filter(|l| l.invoice_id == Some(invoice_id)).collect())
    }

    fn list_by_invoice_ids(&self, invoice_ids: &[Uuid]) -> DomainResult<Vec<InvoiceLine>> {
        Ok(self
            .lines()
            .into_iter()
            .filter(|l| l.invoice_id.is_some_and(|id| invoice_ids.contains(&id)))
            .collect())
    }

    fn list_by_null_invoice(&self) -> DomainResult<Vec<InvoiceLine>> {
        Ok(self.lines().into_iter().filter(|l| l.invoice_id.is_none()).collect())
    }

    fn get_for_assignment(&self) -> DomainResult<Vec<InvoiceLine>> {
        Ok(self.lines().into_iter().filter(|l| !l.is_fully_assigned()).collect())
    }

    fn delete_not_in_ids(
        &self,
        invoice_id: Uuid,
        keep_ids: &BTreeSet<Uuid>,
    ) -> DomainResult<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.lines.len();
        state
            .lines
            .retain(|l| l.invoice_id != Some(invoice_id) || keep_ids.contains(&l.id));
        Ok(before - state.lines.len())
    }
}

/// Arbiter mock that always answers with the same match.
pub struct FixedArbiter {
    answer: Option<CompanyInput>,
    calls: Mutex<usize>,
}

impl FixedArbiter {
    pub fn new(answer: Option<CompanyInput>) -> Arc<Self> {
        Arc::new(Self { answer, calls: Mutex::new(0) })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl CompanyArbiter for FixedArbiter {
    fn resolve_company(
        &self,
        _input: &CompanyInput,
        candidates: &[CompanyInput],
        _min_confidence: f64,
    ) -> DomainResult<Option<CompanyInput>> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.answer.clone().filter(|answer| {
            candidates.iter().any(|candidate| candidate.tax_number == answer.tax_number)
        }))
    }
}

//! Port interfaces for cost node persistence

use costledger_domain::{CostNode, Result};
use uuid::Uuid;

/// Trait for cost node persistence and cost lookups
pub trait CostNodeRepository: Send + Sync {
    fn add(&self, node: &CostNode) -> Result<()>;

    fn add_all(&self, nodes: &[CostNode]) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<CostNode>>;

    /// Get a node by its code within one contract
    fn get_by_code(&self, contract_id: Uuid, code: &str) -> Result<Option<CostNode>>;

    /// List every node of every contract
    fn list_nodes(&self) -> Result<Vec<CostNode>>;

    fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<CostNode>>;

    fn list_by_contract(&self, contract_id: Uuid) -> Result<Vec<CostNode>>;

    fn update(&self, node: &CostNode) -> Result<()>;

    fn update_many(&self, nodes: &[CostNode]) -> Result<()>;

    fn delete_by_contract(&self, contract_id: Uuid) -> Result<()>;

    fn delete_many(&self, ids: &[Uuid]) -> Result<()>;

    fn exists(&self, id: Uuid) -> Result<bool>;

    /// Whether any invoice line is booked against the contract
    fn has_costs(&self, contract_id: Uuid) -> Result<bool>;

    /// Whether any invoice line is booked against the node
    fn node_has_costs(&self, node_id: Uuid) -> Result<bool>;

    /// Active leaf nodes of active contracts, i.e. the nodes costs can be assigned to
    fn list_leaf_nodes_for_active_contracts(&self) -> Result<Vec<CostNode>>;
}

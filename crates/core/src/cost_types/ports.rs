use costledger_domain::{CostType, Result};
use uuid::Uuid;

/// Trait for cost type persistence
pub trait CostTypeRepository: Send + Sync {
    fn add(&self, cost_type: &CostType) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<CostType>>;

    fn get_by_code(&self, code: &str) -> Result<Option<CostType>>;

    fn list(&self) -> Result<Vec<CostType>>;

    fn update(&self, cost_type: &CostType) -> Result<()>;

    fn exists(&self, id: Uuid) -> Result<bool>;
}

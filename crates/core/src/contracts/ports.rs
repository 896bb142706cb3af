//! Port interface for contract persistence

use costledger_domain::{Contract, Result};
use uuid::Uuid;

/// Trait for contract persistence
pub trait ContractRepository: Send + Sync {
    fn add(&self, contract: &Contract) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<Contract>>;

    fn list(&self) -> Result<Vec<Contract>>;

    fn update(&self, contract: &Contract) -> Result<()>;

    fn exists(&self, id: Uuid) -> Result<bool>;

    fn get_by_code(&self, code: &str) -> Result<Option<Contract>>;
}

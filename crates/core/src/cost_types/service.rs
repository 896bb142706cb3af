use std::sync::Arc;

use costledger_domain::{CostType, LedgerError, Result};
use tracing::info;
use uuid::Uuid;

use super::ports::CostTypeRepository;

/// Catalogue maintenance for cost types; codes are stored upper-cased.
pub struct CostTypeService {
    repository: Arc<dyn CostTypeRepository>,
}

impl CostTypeService {
    pub fn new(repository: Arc<dyn CostTypeRepository>) -> Self {
        Self { repository }
    }

    pub fn create(&self, code: &str, name: &str) -> Result<CostType> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(LedgerError::validation("Cost type code is required"));
        }
        if name.trim().is_empty() {
            return Err(LedgerError::validation("Cost type name is required"));
        }
        if self.repository.get_by_code(&code)?.is_some() {
            return Err(LedgerError::Conflict(format!("Cost type '{code}' already exists")));
        }

        let cost_type = CostType::new(code, name.trim());
        self.repository.add(&cost_type)?;
        info!(code = %cost_type.code, "cost type created");
        Ok(cost_type)
    }

    pub fn rename(&self, id: Uuid, name: &str) -> Result<CostType> {
        let updated = self.get(id)?.with_name(name.trim());
        self.repository.update(&updated)?;
        Ok(updated)
    }

    pub fn set_active(&self, id: Uuid, is_active: bool) -> Result<CostType> {
        let updated = self.get(id)?.with_active(is_active);
        self.repository.update(&updated)?;
        info!(code = %updated.code, is_active, "cost type activity changed");
        Ok(updated)
    }

    fn get(&self, id: Uuid) -> Result<CostType> {
        self.repository
            .get(id)?
            .ok_or_else(|| LedgerError::NotFound("Cost type does not exist".into()))
    }
}

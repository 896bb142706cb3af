use std::sync::Arc;

use costledger_domain::{Contract, ContractMetadata, ContractStatus, LedgerError, Result};
use tracing::info;
use uuid::Uuid;

use super::ports::ContractRepository;

/// Contract metadata and lifecycle changes
pub struct UpdateContractService {
    contracts: Arc<dyn ContractRepository>,
}

impl UpdateContractService {
    pub fn new(contracts: Arc<dyn ContractRepository>) -> Self {
        Self { contracts }
    }

    pub fn update_metadata(&self, contract_id: Uuid, metadata: ContractMetadata) -> Result<Contract> {
        let updated = self.get_contract(contract_id)?.with_metadata(metadata);
        self.contracts.update(&updated)?;
        info!(code = %updated.code, "contract metadata updated");
        Ok(updated)
    }

    pub fn change_status(&self, contract_id: Uuid, status: ContractStatus) -> Result<Contract> {
        let updated = self.get_contract(contract_id)?.with_status(status);
        self.contracts.update(&updated)?;
        info!(code = %updated.code, status = %status, "contract status changed");
        Ok(updated)
    }

    fn get_contract(&self, contract_id: Uuid) -> Result<Contract> {
        self.contracts
            .get(contract_id)?
            .ok_or_else(|| LedgerError::NotFound("Contract does not exist".into()))
    }
}

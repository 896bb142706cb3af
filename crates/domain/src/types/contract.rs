//! Construction contracts

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_domain_status_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl_domain_status_conversions!(ContractStatus {
    Planned => "planned",
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// Descriptive contract fields that a structure import replaces wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ContractMetadata {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<BigDecimal>,
    pub path: Option<String>,
    pub status: ContractStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<BigDecimal>,
    /// Workspace directory holding the contract's documents.
    pub path: Option<String>,
    pub status: ContractStatus,
}

impl Contract {
    pub fn with_metadata(self, metadata: ContractMetadata) -> Self {
        Self {
            name: metadata.name,
            description: metadata.description,
            start_date: metadata.start_date,
            end_date: metadata.end_date,
            budget: metadata.budget,
            path: metadata.path,
            status: metadata.status,
            ..self
        }
    }

    pub fn with_status(self, status: ContractStatus) -> Self {
        Self { status, ..self }
    }

    pub fn metadata(&self) -> ContractMetadata {
        ContractMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget.clone(),
            path: self.path.clone(),
            status: self.status,
        }
    }
}

/// Data needed to open a new contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractStarter {
    pub code: String,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub metadata: ContractMetadata,
}

impl ContractStarter {
    pub fn into_contract(self) -> Contract {
        Contract {
            id: Uuid::new_v4(),
            code: self.code,
            name: String::new(),
            owner_id: self.owner_id,
            client_id: self.client_id,
            description: None,
            start_date: None,
            end_date: None,
            budget: None,
            path: None,
            status: ContractStatus::default(),
        }
        .with_metadata(self.metadata)
    }
}

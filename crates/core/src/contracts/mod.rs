//! Contracts: creation, metadata, node edits and structure replacement

pub mod cost_node_service;
pub mod create;
pub mod ports;
pub mod structure;
pub mod update;

pub use cost_node_service::ContractCostNodeService;
pub use create::CreateContractService;
pub use ports::ContractRepository;
pub use structure::{ContractStructureUpdate, UpdateContractStructureService};
pub use update::UpdateContractService;

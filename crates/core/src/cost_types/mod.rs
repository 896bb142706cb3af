//! Cost type catalogue

pub mod ports;
pub mod service;

pub use ports::CostTypeRepository;
pub use service::CostTypeService;

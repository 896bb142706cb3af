//! Contract cost trees: building, validation and persistence port

pub mod ports;
pub mod structure_validator;
pub mod tree_builder;
pub mod validator;

pub use ports::CostNodeRepository;
pub use structure_validator::CostNodeStructureValidator;
pub use tree_builder::{BuildOptions, CostNodeTreeBuilder};
pub use validator::CostNodeEntityValidator;

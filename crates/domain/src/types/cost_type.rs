//! Cost categories (material, labour, equipment...)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostType {
    pub id: Uuid,
    /// Unique upper-case key, e.g. `MATERIAL`.
    pub code: String,
    pub name: String,
    pub is_active: bool,
}

impl CostType {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), code: code.into(), name: name.into(), is_active: true }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self }
    }

    pub fn with_active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }
}

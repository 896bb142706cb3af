//! Port interfaces for company persistence and arbitration
//!
//! These traits define the boundaries between the resolution services and
//! their storage / LLM collaborators.

use costledger_domain::{Company, CompanyInput, Result};
use uuid::Uuid;

/// Trait for company persistence and single-signal lookups
pub trait CompanyRepository: Send + Sync {
    fn add(&self, company: &Company) -> Result<()>;

    fn update(&self, company: &Company) -> Result<()>;

    fn delete(&self, id: Uuid) -> Result<()>;

    fn get(&self, id: Uuid) -> Result<Option<Company>>;

    fn exists(&self, id: Uuid) -> Result<bool>;

    fn list_all(&self) -> Result<Vec<Company>>;

    /// Exact match on the normalized tax number
    fn get_by_tax_number(&self, tax_number: &str) -> Result<Option<Company>>;

    /// Companies with role OWN
    fn get_owners(&self) -> Result<Vec<Company>>;

    fn exists_owner(&self) -> Result<bool>;

    fn find_by_bank_account(&self, number: &str) -> Result<Vec<Company>>;

    fn find_by_email(&self, email: &str) -> Result<Vec<Company>>;

    fn find_by_phone(&self, phone: &str) -> Result<Vec<Company>>;

    /// Case-insensitive substring match on the company name
    fn find_by_name_like(&self, fragment: &str) -> Result<Vec<Company>>;

    /// Companies whose street contains every token (case-insensitive)
    fn find_by_street_tokens(&self, tokens: &[String]) -> Result<Vec<Company>>;
}

/// Trait for an external (LLM) arbiter matching a mention against a fixed
/// candidate set
pub trait CompanyArbiter: Send + Sync {
    /// Return the candidate the input refers to, or `None` when confidence
    /// stays below `min_confidence`.
    fn resolve_company(
        &self,
        input: &CompanyInput,
        candidates: &[CompanyInput],
        min_confidence: f64,
    ) -> Result<Option<CompanyInput>>;
}

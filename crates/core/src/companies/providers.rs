//! Company candidate providers
//!
//! Each provider answers "which existing companies might this mention refer
//! to?" from a single signal. Results are candidates only; the evaluate
//! orchestrator decides what to do with them.

use std::collections::HashSet;
use std::sync::Arc;

use costledger_domain::constants::MIN_NAME_QUERY_LENGTH;
use costledger_domain::{Company, CompanyInput, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use uuid::Uuid;

use super::normalize::{
    normalize_bank_account, normalize_company_name, normalize_email, normalize_phone,
    normalize_tax_number,
};
use super::ports::CompanyRepository;

const STREET_STOPWORDS: &[&str] = &["UL", "UL.", "ALEJA", "AL", "AL.", "PLAC", "PL", "OS", "OS."];

/// Trait for read-only candidate lookups
pub trait CompanyCandidateProvider: Send + Sync {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>>;
}

/// Exact normalized tax number
pub struct ExactTaxNumberProvider {
    repository: Arc<dyn CompanyRepository>,
}

impl ExactTaxNumberProvider {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }
}

impl CompanyCandidateProvider for ExactTaxNumberProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        let Some(tax_number) = normalize_tax_number(input.tax_number.as_deref()) else {
            return Ok(Vec::new());
        };
        Ok(self.repository.get_by_tax_number(&tax_number)?.into_iter().collect())
    }
}

/// Exact normalized bank account number
pub struct BankAccountProvider {
    repository: Arc<dyn CompanyRepository>,
}

impl BankAccountProvider {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }
}

impl CompanyCandidateProvider for BankAccountProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        match normalize_bank_account(input.bank_account.as_deref()) {
            Some(number) => self.repository.find_by_bank_account(&number),
            None => Ok(Vec::new()),
        }
    }
}

/// Exact lower-cased e-mail
pub struct EmailProvider {
    repository: Arc<dyn CompanyRepository>,
}

impl EmailProvider {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }
}

impl CompanyCandidateProvider for EmailProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        match normalize_email(input.email.as_deref()) {
            Some(email) => self.repository.find_by_email(&email),
            None => Ok(Vec::new()),
        }
    }
}

/// Exact nine-digit phone number
pub struct PhoneProvider {
    repository: Arc<dyn CompanyRepository>,
}

impl PhoneProvider {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }
}

impl CompanyCandidateProvider for PhoneProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        match normalize_phone(input.phone_number.as_deref()) {
            Some(phone) => self.repository.find_by_phone(&phone),
            None => Ok(Vec::new()),
        }
    }
}

/// Fuzzy name match on legal-suffix-free names
pub struct NameProvider {
    repository: Arc<dyn CompanyRepository>,
}

impl NameProvider {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }
}

impl CompanyCandidateProvider for NameProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        let Some(name) = input.name.as_deref() else {
            return Ok(Vec::new());
        };
        if name.chars().count() < MIN_NAME_QUERY_LENGTH {
            return Ok(Vec::new());
        }
        let Some(wanted) = normalize_company_name(Some(name)) else {
            return Ok(Vec::new());
        };

        let candidates = self
            .repository
            .list_all()?
            .into_iter()
            .filter(|company| {
                normalize_company_name(Some(&company.name)).is_some_and(|existing| {
                    existing == wanted || existing.contains(&wanted) || wanted.contains(&existing)
                })
            })
            .collect();
        Ok(candidates)
    }
}

/// Street name tokens plus building number
pub struct AddressProvider {
    repository: Arc<dyn CompanyRepository>,
}

impl AddressProvider {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }
}

impl CompanyCandidateProvider for AddressProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        let Some(street) = input.street.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(Vec::new());
        };

        let tokens = extract_street_tokens(street);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let number = extract_street_number(street);

        let mut query = tokens.clone();
        query.extend(number.clone());

        let wanted: HashSet<&String> = tokens.iter().collect();
        let candidates = self
            .repository
            .find_by_street_tokens(&query)?
            .into_iter()
            .filter(|company| {
                let Some(existing_street) = company.street().filter(|s| !s.is_empty()) else {
                    return false;
                };
                let existing_tokens = extract_street_tokens(existing_street);
                let shared =
                    existing_tokens.iter().filter(|token| wanted.contains(token)).count();

                let same_number =
                    number.is_some() && extract_street_number(existing_street) == number;
                (same_number && shared >= 1) || shared >= 2
            })
            .collect();
        Ok(candidates)
    }
}

static STREET_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d+[A-Z]?(?:/\d+)?\b")
        .expect("STREET_NUMBER_REGEX should compile - this is a bug")
});

static TOKEN_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w]+").expect("TOKEN_SEPARATOR_REGEX should compile - this is a bug")
});

/// Building number such as `12`, `12A` or `12/3`.
pub fn extract_street_number(street: &str) -> Option<String> {
    STREET_NUMBER_REGEX.find(&street.to_uppercase()).map(|m| m.as_str().to_string())
}

/// Street name tokens without the building number and stopwords.
pub fn extract_street_tokens(street: &str) -> Vec<String> {
    let upper = street.trim().to_uppercase();
    let without_number = STREET_NUMBER_REGEX.replace_all(&upper, "");

    TOKEN_SEPARATOR_REGEX
        .split(&without_number)
        .filter(|token| token.chars().count() >= 3 && !STREET_STOPWORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Union of several providers, deduplicated by company id in first-seen order.
pub struct CompositeCandidateProvider {
    providers: Vec<Arc<dyn CompanyCandidateProvider>>,
}

impl CompositeCandidateProvider {
    pub fn new(providers: Vec<Arc<dyn CompanyCandidateProvider>>) -> Self {
        Self { providers }
    }

    /// All single-signal providers, strongest signal first.
    pub fn standard(repository: &Arc<dyn CompanyRepository>) -> Self {
        Self::new(vec![
            Arc::new(ExactTaxNumberProvider::new(Arc::clone(repository))),
            Arc::new(BankAccountProvider::new(Arc::clone(repository))),
            Arc::new(EmailProvider::new(Arc::clone(repository))),
            Arc::new(PhoneProvider::new(Arc::clone(repository))),
            Arc::new(NameProvider::new(Arc::clone(repository))),
            Arc::new(AddressProvider::new(Arc::clone(repository))),
        ])
    }
}

impl CompanyCandidateProvider for CompositeCandidateProvider {
    fn find_candidates(&self, input: &CompanyInput) -> Result<Vec<Company>> {
        let mut unique: IndexMap<Uuid, Company> = IndexMap::new();
        for provider in &self.providers {
            for company in provider.find_candidates(input)? {
                unique.entry(company.id).or_insert(company);
            }
        }

        debug!(candidates = unique.len(), "company candidates collected");
        Ok(unique.into_values().collect())
    }
}

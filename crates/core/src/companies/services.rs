//! Company master-data services
//!
//! Manual create / update / role changes. Each service normalizes identifiers
//! the same way the resolution path does, so both paths meet on equal keys.

use std::collections::BTreeSet;
use std::sync::Arc;

use costledger_domain::constants::PLACEHOLDER_TAX_PREFIX;
use costledger_domain::{
    Address, BankAccount, Company, CompanyRole, Contact, LedgerError, Result,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use super::normalize::{
    normalize_bank_account, normalize_company_name, normalize_email, normalize_phone,
    normalize_tax_number,
};
use super::ports::CompanyRepository;

/// Stateless normalization facade used by the master-data services.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyNormalizeService;

impl CompanyNormalizeService {
    pub fn new() -> Self {
        Self
    }

    pub fn tax_number(&self, value: Option<&str>) -> Option<String> {
        normalize_tax_number(value)
    }

    /// Tax number that must be present and well-formed.
    pub fn required_tax_number(&self, value: &str) -> Result<String> {
        normalize_tax_number(Some(value))
            .ok_or_else(|| LedgerError::validation(format!("Invalid tax_number in Company: {value}")))
    }

    pub fn bank_account(&self, value: Option<&str>) -> Option<String> {
        normalize_bank_account(value)
    }

    pub fn phone(&self, value: Option<&str>) -> Option<String> {
        normalize_phone(value)
    }

    pub fn email(&self, value: Option<&str>) -> Option<String> {
        normalize_email(value)
    }

    pub fn name(&self, value: Option<&str>) -> Option<String> {
        normalize_company_name(value)
    }

    /// Company with normalized tax number, contact and bank account.
    ///
    /// Contact and bank account are dropped when nothing survives
    /// normalization.
    pub fn normalize(&self, company: Company) -> Result<Company> {
        let tax_number = if company.tax_number.starts_with(PLACEHOLDER_TAX_PREFIX) {
            company.tax_number.clone()
        } else {
            self.required_tax_number(&company.tax_number)?
        };

        let contact = company
            .contact
            .as_ref()
            .map(|contact| Contact {
                phone_number: self.phone(contact.phone_number.as_deref()),
                email: self.email(contact.email.as_deref()),
            })
            .filter(|contact| !contact.is_empty());

        let bank_account = company.bank_account.as_ref().and_then(|account| {
            self.bank_account(Some(&account.number)).map(|number| {
                BankAccount::new(&number).with_country_code(account.country_code.clone())
            })
        });

        Ok(company.with_tax_number(tax_number).with_contact(contact).with_bank_account(bank_account))
    }
}

static ZIP_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}-\d{3}$").expect("ZIP_CODE_REGEX should compile - this is a bug")
});

/// Format checks for manually entered company data.
pub struct CompanyInputValidator;

impl CompanyInputValidator {
    pub fn validate(company: &Company) -> Result<()> {
        if company.name.trim().is_empty() {
            return Err(LedgerError::validation("Company name is required"));
        }
        if let Some(address) = &company.address {
            Self::validate_address(address)?;
        }
        if let Some(account) = &company.bank_account {
            Self::validate_bank_account(account)?;
        }
        Ok(())
    }

    /// Polish addresses need an `NN-NNN` zip code.
    pub fn validate_address(address: &Address) -> Result<()> {
        if address.is_polish() && !ZIP_CODE_REGEX.is_match(address.zip_code.trim()) {
            return Err(LedgerError::validation(format!(
                "Invalid Polish zip code: '{}'",
                address.zip_code
            )));
        }
        Ok(())
    }

    pub fn validate_bank_account(account: &BankAccount) -> Result<()> {
        let Some(code) = account.country_code.as_deref() else {
            return Ok(());
        };
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(LedgerError::validation(format!("Invalid bank country code: '{code}'")));
        }
        if code.eq_ignore_ascii_case("PL")
            && (account.number.len() != 26 || !account.number.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(LedgerError::validation("Polish bank account must have 26 digits"));
        }
        Ok(())
    }
}

/// Data for a manually created company
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub tax_number: String,
    pub role: CompanyRole,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub contact: Option<Contact>,
    pub bank_account: Option<BankAccount>,
    pub tags: BTreeSet<String>,
}

impl NewCompany {
    pub fn new(name: impl Into<String>, tax_number: impl Into<String>, role: CompanyRole) -> Self {
        Self {
            name: name.into(),
            tax_number: tax_number.into(),
            role,
            description: None,
            address: None,
            contact: None,
            bank_account: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn with_bank_account(mut self, bank_account: BankAccount) -> Self {
        self.bank_account = Some(bank_account);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = tags;
        self
    }
}

pub struct CreateCompanyService {
    repository: Arc<dyn CompanyRepository>,
    normalizer: CompanyNormalizeService,
}

impl CreateCompanyService {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository, normalizer: CompanyNormalizeService::new() }
    }

    pub fn create(&self, new_company: NewCompany) -> Result<Company> {
        let company = Company::new(new_company.name, new_company.tax_number, new_company.role)
            .with_description(new_company.description)
            .with_address(new_company.address)
            .with_contact(new_company.contact)
            .with_bank_account(new_company.bank_account)
            .with_tags(new_company.tags)
            .with_active(true);

        let company = self.normalizer.normalize(company)?;
        CompanyInputValidator::validate(&company)?;

        if self.repository.get_by_tax_number(&company.tax_number)?.is_some() {
            return Err(LedgerError::Conflict(
                "Company with this tax number already exists".into(),
            ));
        }

        self.repository.add(&company)?;
        info!(id = %company.id, tax_number = %company.tax_number, "company created");
        Ok(company)
    }
}

pub struct UpdateCompanyService {
    repository: Arc<dyn CompanyRepository>,
    normalizer: CompanyNormalizeService,
}

impl UpdateCompanyService {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository, normalizer: CompanyNormalizeService::new() }
    }

    /// Replace a company's master data; the id selects the company.
    pub fn update(&self, company: Company) -> Result<Company> {
        if !self.repository.exists(company.id)? {
            return Err(LedgerError::NotFound("Company does not exist".into()));
        }

        let company = self.normalizer.normalize(company)?;
        CompanyInputValidator::validate(&company)?;

        if let Some(owner) = self.repository.get_by_tax_number(&company.tax_number)? {
            if owner.id != company.id {
                return Err(LedgerError::Conflict(
                    "Company with this tax number already exists".into(),
                ));
            }
        }

        self.repository.update(&company)?;
        info!(id = %company.id, "company updated");
        Ok(company)
    }
}

pub struct ChangeCompanyRoleService {
    repository: Arc<dyn CompanyRepository>,
}

impl ChangeCompanyRoleService {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }

    pub fn change_role(&self, company_id: Uuid, role: CompanyRole) -> Result<Company> {
        let company = self
            .repository
            .get(company_id)?
            .ok_or_else(|| LedgerError::NotFound("Company does not exist".into()))?;

        let updated = company.with_role(role);
        self.repository.update(&updated)?;
        info!(id = %company_id, role = %role, "company role changed");
        Ok(updated)
    }
}

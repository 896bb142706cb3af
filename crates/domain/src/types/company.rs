//! Companies, their contact data and unresolved company mentions

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::PLACEHOLDER_TAX_PREFIX;
use crate::impl_domain_status_conversions;

/// Relationship of a company to the ledger owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyRole {
    Own,
    Cooperative,
    Occasional,
    Supplier,
    Client,
    Buyer,
    Seller,
}

impl_domain_status_conversions!(CompanyRole {
    Own => "own",
    Cooperative => "cooperative",
    Occasional => "occasional",
    Supplier => "supplier",
    Client => "client",
    Buyer => "buyer",
    Seller => "seller",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        zip_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            zip_code: zip_code.into(),
            country: country.into(),
        }
    }

    pub fn with_street(self, street: impl Into<String>) -> Self {
        Self { street: street.into(), ..self }
    }

    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self { city: city.into(), ..self }
    }

    pub fn with_zip_code(self, zip_code: impl Into<String>) -> Self {
        Self { zip_code: zip_code.into(), ..self }
    }

    pub fn with_country(self, country: impl Into<String>) -> Self {
        Self { country: country.into(), ..self }
    }

    /// True when the country names Poland in any of the accepted spellings.
    pub fn is_polish(&self) -> bool {
        matches!(self.country.trim().to_uppercase().as_str(), "PL" | "POLAND" | "POLSKA")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Contact {
    pub phone_number: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn with_phone_number(self, phone_number: Option<String>) -> Self {
        Self { phone_number, ..self }
    }

    pub fn with_email(self, email: Option<String>) -> Self {
        Self { email, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.phone_number.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    pub number: String,
    pub country_code: Option<String>,
}

impl BankAccount {
    /// Account number with all spaces removed.
    pub fn new(number: &str) -> Self {
        Self { number: number.replace(' ', ""), country_code: None }
    }

    pub fn with_country_code(self, country_code: Option<String>) -> Self {
        Self { country_code: country_code.map(|code| code.trim().to_uppercase()), ..self }
    }

    /// IBAN form, available only when the country code is known.
    pub fn iban(&self) -> Option<String> {
        self.country_code.as_ref().map(|code| format!("{code}{}", self.number))
    }
}

/// A persisted company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Normalized NIP, or a `TMP-` placeholder when the real one is unknown.
    pub tax_number: String,
    pub address: Option<Address>,
    pub contact: Option<Contact>,
    pub bank_account: Option<BankAccount>,
    pub role: CompanyRole,
    pub tags: BTreeSet<String>,
    pub is_active: bool,
}

impl Company {
    /// New active company with no address, contact or bank data.
    pub fn new(name: impl Into<String>, tax_number: impl Into<String>, role: CompanyRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            tax_number: tax_number.into(),
            address: None,
            contact: None,
            bank_account: None,
            role,
            tags: BTreeSet::new(),
            is_active: true,
        }
    }

    pub fn with_id(self, id: Uuid) -> Self {
        Self { id, ..self }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self { name: name.into(), ..self }
    }

    pub fn with_description(self, description: Option<String>) -> Self {
        Self { description, ..self }
    }

    pub fn with_tax_number(self, tax_number: impl Into<String>) -> Self {
        Self { tax_number: tax_number.into(), ..self }
    }

    pub fn with_address(self, address: Option<Address>) -> Self {
        Self { address, ..self }
    }

    pub fn with_contact(self, contact: Option<Contact>) -> Self {
        Self { contact, ..self }
    }

    pub fn with_bank_account(self, bank_account: Option<BankAccount>) -> Self {
        Self { bank_account, ..self }
    }

    pub fn with_role(self, role: CompanyRole) -> Self {
        Self { role, ..self }
    }

    pub fn with_tags(self, tags: BTreeSet<String>) -> Self {
        Self { tags, ..self }
    }

    pub fn with_active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }

    pub fn has_placeholder_tax_number(&self) -> bool {
        self.tax_number.starts_with(PLACEHOLDER_TAX_PREFIX)
    }

    pub fn is_active_owner(&self) -> bool {
        self.role == CompanyRole::Own && self.is_active
    }

    pub fn street(&self) -> Option<&str> {
        self.address.as_ref().map(|address| address.street.as_str())
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.contact.as_ref().and_then(|contact| contact.phone_number.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        self.contact.as_ref().and_then(|contact| contact.email.as_deref())
    }
}

/// Unresolved company mention read from a document or spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CompanyInput {
    pub name: Option<String>,
    pub tax_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub bank_account: Option<String>,
    pub role: Option<CompanyRole>,
}

impl CompanyInput {
    /// Input carrying only a tax number and a role.
    pub fn from_tax_number(tax_number: impl Into<String>, role: CompanyRole) -> Self {
        Self { tax_number: Some(tax_number.into()), role: Some(role), ..Self::default() }
    }

    /// Snapshot of a persisted company, used when presenting owners to an arbiter.
    pub fn from_company(company: &Company) -> Self {
        let address = company.address.as_ref();
        Self {
            name: Some(company.name.clone()),
            tax_number: Some(company.tax_number.clone()),
            street: address.map(|a| a.street.clone()),
            city: address.map(|a| a.city.clone()),
            zip_code: address.map(|a| a.zip_code.clone()),
            country: address.map(|a| a.country.clone()),
            phone_number: company.phone_number().map(str::to_owned),
            email: company.email().map(str::to_owned),
            bank_account: company.bank_account.as_ref().map(|b| b.number.clone()),
            role: Some(company.role),
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..self }
    }

    pub fn with_tax_number(self, tax_number: impl Into<String>) -> Self {
        Self { tax_number: Some(tax_number.into()), ..self }
    }

    pub fn with_street(self, street: impl Into<String>) -> Self {
        Self { street: Some(street.into()), ..self }
    }

    pub fn with_city(self, city: impl Into<String>) -> Self {
        Self { city: Some(city.into()), ..self }
    }

    pub fn with_zip_code(self, zip_code: impl Into<String>) -> Self {
        Self { zip_code: Some(zip_code.into()), ..self }
    }

    pub fn with_country(self, country: impl Into<String>) -> Self {
        Self { country: Some(country.into()), ..self }
    }

    pub fn with_phone_number(self, phone_number: impl Into<String>) -> Self {
        Self { phone_number: Some(phone_number.into()), ..self }
    }

    pub fn with_email(self, email: impl Into<String>) -> Self {
        Self { email: Some(email.into()), ..self }
    }

    pub fn with_bank_account(self, bank_account: impl Into<String>) -> Self {
        Self { bank_account: Some(bank_account.into()), ..self }
    }

    pub fn with_role(self, role: CompanyRole) -> Self {
        Self { role: Some(role), ..self }
    }
}

/// Company row of a spreadsheet batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyExport {
    pub id: Uuid,
    pub name: String,
    pub tax_number: String,
}

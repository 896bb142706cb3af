//! Per-field company updaters.
//!
//! Each scored field maps to a pure function producing an updated copy of the
//! company. `None` means normalization rejected the value and the company is
//! left as it was.

use costledger_domain::{BankAccount, Company};

use super::normalize::{
    normalize_bank_account, normalize_email, normalize_phone, normalize_tax_number,
};
use super::quality::CompanyField;

pub type FieldUpdater = fn(Company, &str) -> Option<Company>;

pub const FIELD_UPDATERS: [(CompanyField, FieldUpdater); 9] = [
    (CompanyField::TaxNumber, update_tax_number),
    (CompanyField::BankAccount, update_bank_account),
    (CompanyField::Email, update_email),
    (CompanyField::PhoneNumber, update_phone_number),
    (CompanyField::Name, update_name),
    (CompanyField::Street, update_street),
    (CompanyField::ZipCode, update_zip_code),
    (CompanyField::City, update_city),
    (CompanyField::Country, update_country),
];

/// Look up the updater for `field` and apply it.
pub fn apply_field(company: Company, field: CompanyField, value: &str) -> Option<Company> {
    FIELD_UPDATERS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .and_then(|(_, updater)| updater(company, value))
}

/// The value as it would be stored on a company.
pub fn normalized_value(field: CompanyField, value: &str) -> Option<String> {
    match field {
        CompanyField::TaxNumber => normalize_tax_number(Some(value)),
        CompanyField::BankAccount => normalize_bank_account(Some(value)),
        CompanyField::Email => normalize_email(Some(value)),
        CompanyField::PhoneNumber => normalize_phone(Some(value)),
        CompanyField::Name
        | CompanyField::Street
        | CompanyField::ZipCode
        | CompanyField::City
        | CompanyField::Country => Some(value.trim().to_string()),
    }
}

fn update_tax_number(company: Company, value: &str) -> Option<Company> {
    normalize_tax_number(Some(value)).map(|tax| company.with_tax_number(tax))
}

fn update_bank_account(company: Company, value: &str) -> Option<Company> {
    normalize_bank_account(Some(value))
        .map(|number| company.with_bank_account(Some(BankAccount::new(&number))))
}

fn update_email(company: Company, value: &str) -> Option<Company> {
    let contact = company.contact.clone().unwrap_or_default().with_email(normalize_email(Some(value)));
    Some(company.with_contact(Some(contact)))
}

fn update_phone_number(company: Company, value: &str) -> Option<Company> {
    let phone = normalize_phone(Some(value))?;
    let contact = company.contact.clone().unwrap_or_default().with_phone_number(Some(phone));
    Some(company.with_contact(Some(contact)))
}

fn update_name(company: Company, value: &str) -> Option<Company> {
    Some(company.with_name(value.trim()))
}

fn update_street(company: Company, value: &str) -> Option<Company> {
    let address = company.address.clone().unwrap_or_default().with_street(value.trim());
    Some(company.with_address(Some(address)))
}

fn update_zip_code(company: Company, value: &str) -> Option<Company> {
    let address = company.address.clone().unwrap_or_default().with_zip_code(value.trim());
    Some(company.with_address(Some(address)))
}

fn update_city(company: Company, value: &str) -> Option<Company> {
    let address = company.address.clone().unwrap_or_default().with_city(value.trim());
    Some(company.with_address(Some(address)))
}

fn update_country(company: Company, value: &str) -> Option<Company> {
    let address = company.address.clone().unwrap_or_default().with_country(value.trim());
    Some(company.with_address(Some(address)))
}

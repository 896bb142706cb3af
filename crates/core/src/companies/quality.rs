//! Confidence scoring of a single company data snapshot.
//!
//! A snapshot describes how trustworthy each field looks on its own; it never
//! compares two companies and never mutates anything.

use std::collections::HashMap;

use costledger_domain::{impl_domain_status_conversions, Company, CompanyInput};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::normalize::{is_valid_nip, normalize_phone};

/// Scored company fields, in the order updates are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyField {
    TaxNumber,
    BankAccount,
    Email,
    PhoneNumber,
    Name,
    Street,
    ZipCode,
    City,
    Country,
}

impl_domain_status_conversions!(CompanyField {
    TaxNumber => "tax_number",
    BankAccount => "bank_account",
    Email => "email",
    PhoneNumber => "phone_number",
    Name => "name",
    Street => "street",
    ZipCode => "zip_code",
    City => "city",
    Country => "country",
});

impl CompanyField {
    pub const ALL: [Self; 9] = [
        Self::TaxNumber,
        Self::BankAccount,
        Self::Email,
        Self::PhoneNumber,
        Self::Name,
        Self::Street,
        Self::ZipCode,
        Self::City,
        Self::Country,
    ];

    /// Contribution of the field to the overall score. Weights sum to 1.
    pub const fn weight(self) -> f64 {
        match self {
            Self::TaxNumber | Self::BankAccount => 0.22,
            Self::Email => 0.15,
            Self::PhoneNumber | Self::ZipCode => 0.10,
            Self::Street | Self::Name => 0.07,
            Self::City => 0.05,
            Self::Country => 0.02,
        }
    }
}

/// Where a snapshot's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyDataSource {
    Ocr,
    Excel,
    Api,
    Manual,
    System,
}

impl_domain_status_conversions!(CompanyDataSource {
    Ocr => "ocr",
    Excel => "excel",
    Api => "api",
    Manual => "manual",
    System => "system",
});

/// Field-level and overall quality of one company snapshot.
#[derive(Debug, Clone)]
pub struct CompanyDataQuality {
    values: HashMap<CompanyField, String>,
    scores: HashMap<CompanyField, u8>,
    source: CompanyDataSource,
}

impl CompanyDataQuality {
    /// Snapshot of persisted master data.
    pub fn from_company(company: &Company) -> Self {
        let address = company.address.as_ref();
        Self::from_values(
            [
                (CompanyField::Name, Some(company.name.as_str())),
                (CompanyField::TaxNumber, Some(company.tax_number.as_str())),
                (CompanyField::Street, address.map(|a| a.street.as_str())),
                (CompanyField::City, address.map(|a| a.city.as_str())),
                (CompanyField::ZipCode, address.map(|a| a.zip_code.as_str())),
                (CompanyField::Country, address.map(|a| a.country.as_str())),
                (CompanyField::PhoneNumber, company.phone_number()),
                (CompanyField::Email, company.email()),
                (CompanyField::BankAccount, company.bank_account.as_ref().map(|b| b.number.as_str())),
            ],
            CompanyDataSource::System,
        )
    }

    /// Snapshot of an incoming, unresolved mention.
    pub fn from_input(input: &CompanyInput) -> Self {
        Self::from_values(
            [
                (CompanyField::Name, input.name.as_deref()),
                (CompanyField::TaxNumber, input.tax_number.as_deref()),
                (CompanyField::Street, input.street.as_deref()),
                (CompanyField::City, input.city.as_deref()),
                (CompanyField::ZipCode, input.zip_code.as_deref()),
                (CompanyField::Country, input.country.as_deref()),
                (CompanyField::PhoneNumber, input.phone_number.as_deref()),
                (CompanyField::Email, input.email.as_deref()),
                (CompanyField::BankAccount, input.bank_account.as_deref()),
            ],
            CompanyDataSource::Ocr,
        )
    }

    fn from_values<'a>(
        values: impl IntoIterator<Item = (CompanyField, Option<&'a str>)>,
        source: CompanyDataSource,
    ) -> Self {
        let values: HashMap<CompanyField, String> = values
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v.to_string())))
            .collect();

        let scores = CompanyField::ALL
            .iter()
            .map(|field| (*field, score_field(*field, values.get(field).map(String::as_str))))
            .collect();

        Self { values, scores, source }
    }

    pub const fn with_source(mut self, source: CompanyDataSource) -> Self {
        self.source = source;
        self
    }

    pub const fn source(&self) -> CompanyDataSource {
        self.source
    }

    /// Score 0–100 of a single field; missing fields score 0.
    pub fn field_score(&self, field: CompanyField) -> u8 {
        self.scores.get(&field).copied().unwrap_or(0)
    }

    pub fn field_scores(&self) -> Vec<(CompanyField, u8)> {
        CompanyField::ALL.iter().map(|field| (*field, self.field_score(*field))).collect()
    }

    /// Weighted sum of field scores, rounded to an integer in 0–100.
    pub fn overall_score(&self) -> u8 {
        let weighted: f64 = CompanyField::ALL
            .iter()
            .map(|field| f64::from(self.field_score(*field)) * field.weight())
            .sum();
        // Bounded by the weight sum, so the cast cannot truncate.
        let overall = weighted.round().clamp(0.0, 100.0) as u8;
        debug!(overall, source = %self.source, "company snapshot scored");
        overall
    }

    /// The snapshot carries a non-blank value for the field.
    pub fn has_field(&self, field: CompanyField) -> bool {
        self.value(field).is_some_and(|value| !value.trim().is_empty())
    }

    pub fn value(&self, field: CompanyField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }
}

fn score_field(field: CompanyField, value: Option<&str>) -> u8 {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return 0;
    };

    match field {
        CompanyField::Name => score_name(value),
        CompanyField::TaxNumber => full_if(is_valid_nip(value)),
        CompanyField::Street => score_street(value),
        CompanyField::City => full_if(value.trim().chars().count() >= 3),
        CompanyField::ZipCode => score_zip_code(value),
        CompanyField::Country => {
            full_if(matches!(value.trim().to_uppercase().as_str(), "PL" | "POLSKA" | "POLAND"))
        }
        CompanyField::PhoneNumber => full_if(normalize_phone(Some(value)).is_some()),
        CompanyField::Email => full_if(EMAIL_REGEX.is_match(value)),
        CompanyField::BankAccount => {
            let digits = value.replace("PL", "").chars().filter(char::is_ascii_digit).count();
            full_if(digits == 26)
        }
    }
}

const fn full_if(condition: bool) -> u8 {
    if condition {
        100
    } else {
        0
    }
}

fn score_name(value: &str) -> u8 {
    let upper = value.trim().to_uppercase();
    if upper.starts_with("AI_") || matches!(upper.as_str(), "UNKNOWN" | "N/A" | "-" | "?") {
        return 0;
    }
    if upper.chars().count() < 3 || !upper.chars().any(char::is_alphabetic) {
        return 0;
    }

    let significant =
        upper.chars().filter(|c| !c.is_whitespace() && *c != '-' && *c != '.').count();
    if significant >= 6 {
        100
    } else {
        50
    }
}

fn score_street(value: &str) -> u8 {
    if value.trim().chars().count() < 3 {
        0
    } else if value.chars().any(|c| c.is_ascii_digit()) {
        100
    } else {
        50
    }
}

fn score_zip_code(value: &str) -> u8 {
    if ZIP_CODE_REGEX.is_match(value) {
        return 100;
    }
    if value.chars().filter(char::is_ascii_digit).count() == 5 {
        50
    } else {
        0
    }
}

static ZIP_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}-\d{3}$").expect("ZIP_CODE_REGEX should compile - this is a bug")
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@]+@[^@]+\.[^@]+$").expect("EMAIL_REGEX should compile - this is a bug")
});

//! Company resolution: create, pick and merge
//!
//! `evaluate` turns an unresolved company mention into a persisted company.
//! When nothing matches a new company is created; otherwise the best existing
//! candidate is kept and improved with whatever the mention knows better.

use std::sync::Arc;

use costledger_domain::constants::{PLACEHOLDER_TAX_PREFIX, UNKNOWN_COMPANY_NAME};
use costledger_domain::{
    Address, BankAccount, Company, CompanyInput, CompanyRole, Contact, LedgerError,
    ResolutionConfig, Result,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::fields::{apply_field, normalized_value};
use super::normalize::{
    normalize_bank_account, normalize_email, normalize_phone, normalize_tax_number,
};
use super::ports::{CompanyArbiter, CompanyRepository};
use super::providers::CompanyCandidateProvider;
use super::quality::{CompanyDataQuality, CompanyField};

pub struct CompanyEvaluateOrchestrator {
    repository: Arc<dyn CompanyRepository>,
    candidates: Arc<dyn CompanyCandidateProvider>,
    arbiter: Option<Arc<dyn CompanyArbiter>>,
    resolution: ResolutionConfig,
}

impl CompanyEvaluateOrchestrator {
    pub fn new(
        repository: Arc<dyn CompanyRepository>,
        candidates: Arc<dyn CompanyCandidateProvider>,
    ) -> Self {
        Self { repository, candidates, arbiter: None, resolution: ResolutionConfig::default() }
    }

    pub fn with_arbiter(mut self, arbiter: Arc<dyn CompanyArbiter>) -> Self {
        self.arbiter = Some(arbiter);
        self
    }

    pub fn with_resolution(mut self, resolution: ResolutionConfig) -> Self {
        self.resolution = resolution;
        self
    }

    /// Resolve a mention to a persisted company, creating one only when no
    /// candidate exists.
    pub fn evaluate(&self, input: &CompanyInput) -> Result<Company> {
        info!(name = ?input.name, tax_number = ?input.tax_number, "evaluating company");
        let candidates = self.candidates.find_candidates(input)?;
        self.resolve_among(input, candidates)
    }

    /// Resolve a bare tax number, as found in spreadsheet exports.
    pub fn evaluate_from_tax(&self, tax_number: Option<&str>, role: CompanyRole) -> Result<Company> {
        let tax_number = tax_number.map(str::trim).filter(|tax| !tax.is_empty()).ok_or_else(|| {
            LedgerError::InvalidInput("No tax number provided, unable to evaluate company".into())
        })?;
        self.evaluate(&CompanyInput::from_tax_number(tax_number, role))
    }

    /// Resolve an invoice buyer, asking the arbiter to pick among the ledger
    /// owners when the deterministic candidates contain none.
    pub fn resolve_buyer(&self, input: &CompanyInput) -> Result<Company> {
        let candidates = self.candidates.find_candidates(input)?;
        if candidates.iter().any(Company::is_active_owner) {
            return self.resolve_among(input, candidates);
        }

        let Some(arbiter) = &self.arbiter else {
            return self.resolve_among(input, candidates);
        };

        let owners: Vec<Company> =
            self.repository.get_owners()?.into_iter().filter(|owner| owner.is_active).collect();
        if owners.is_empty() {
            return self.resolve_among(input, candidates);
        }

        let owner_inputs: Vec<CompanyInput> = owners.iter().map(CompanyInput::from_company).collect();
        let matched =
            arbiter.resolve_company(input, &owner_inputs, self.resolution.arbiter_min_confidence)?;

        let owner = matched.and_then(|matched| {
            let wanted = normalize_tax_number(matched.tax_number.as_deref())?;
            owners.into_iter().find(|owner| owner.tax_number == wanted)
        });

        match owner {
            Some(owner) => {
                info!(owner = %owner.name, "buyer matched to owner by arbiter");
                self.maybe_update(owner, input)
            }
            None => {
                debug!("arbiter found no owner match");
                self.resolve_among(input, candidates)
            }
        }
    }

    fn resolve_among(&self, input: &CompanyInput, candidates: Vec<Company>) -> Result<Company> {
        if candidates.is_empty() {
            info!("no company candidates, creating a new company");
            return self.create_company(input);
        }

        let has_owner = candidates.iter().any(Company::is_active_owner);
        let pool: Vec<Company> = if has_owner {
            candidates.into_iter().filter(Company::is_active_owner).collect()
        } else {
            candidates
        };

        let mut best: Option<(u8, Company)> = None;
        for candidate in pool {
            let score = CompanyDataQuality::from_company(&candidate).overall_score();
            debug!(candidate = %candidate.name, score, "company candidate");
            if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((_, company)) => self.maybe_update(company, input),
            None => self.create_company(input),
        }
    }

    fn create_company(&self, input: &CompanyInput) -> Result<Company> {
        let tax_number = normalize_tax_number(input.tax_number.as_deref())
            .unwrap_or_else(generate_placeholder_tax_number);

        let address = Address::new(
            input.street.clone().unwrap_or_default(),
            input.city.clone().unwrap_or_default(),
            input.zip_code.clone().unwrap_or_default(),
            input.country.clone().unwrap_or_default(),
        );
        let contact = Contact {
            phone_number: normalize_phone(input.phone_number.as_deref()),
            email: normalize_email(input.email.as_deref()),
        };
        let bank_account =
            normalize_bank_account(input.bank_account.as_deref()).map(|n| BankAccount::new(&n));

        let company = Company::new(
            input.name.clone().unwrap_or_else(|| UNKNOWN_COMPANY_NAME.to_string()),
            tax_number,
            input.role.unwrap_or(CompanyRole::Supplier),
        )
        .with_address(Some(address))
        .with_contact(Some(contact))
        .with_bank_account(bank_account)
        .with_active(true);

        self.repository.add(&company)?;
        info!(tax_number = %company.tax_number, name = %company.name, "company created");
        Ok(company)
    }

    fn maybe_update(&self, company: Company, input: &CompanyInput) -> Result<Company> {
        let input_quality = CompanyDataQuality::from_input(input);
        let company_quality = CompanyDataQuality::from_company(&company);

        let input_overall = input_quality.overall_score();
        let company_overall = company_quality.overall_score();
        let full_update = input_overall >= self.resolution.full_update_threshold
            && input_overall > company_overall;

        info!(
            full_update,
            input_score = input_overall,
            company_score = company_overall,
            company = %company.name,
            "company update decision"
        );

        let mut updated = company.clone();
        let mut changed = false;

        for field in CompanyField::ALL {
            if !input_quality.has_field(field) {
                continue;
            }

            let input_score = input_quality.field_score(field);
            let company_score = company_quality.field_score(field);
            if full_update {
                if input_score == 0 {
                    continue;
                }
            } else if input_score <= company_score {
                continue;
            }

            let Some(raw_value) = input_quality.value(field) else {
                continue;
            };
            let incoming = normalized_value(field, raw_value);
            if incoming.is_some() && incoming.as_deref() == company_quality.value(field) {
                continue;
            }

            match apply_field(updated.clone(), field, raw_value) {
                Some(next) => {
                    updated = next;
                    changed = true;
                    info!(
                        field = %field,
                        input_score,
                        company_score,
                        company = %company.name,
                        "company field updated"
                    );
                }
                None => warn!(field = %field, "rejected company field value"),
            }
        }

        if !changed {
            return Ok(company);
        }

        self.repository.update(&updated)?;
        Ok(updated)
    }
}

fn generate_placeholder_tax_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{PLACEHOLDER_TAX_PREFIX}{}", &hex[..8])
}

//! Spreadsheet company rows applied to master data

use std::sync::Arc;

use costledger_domain::{impl_domain_status_conversions, CompanyExport, CompanyRole, Result};
use tracing::{info, warn};
use uuid::Uuid;

use super::ports::CompanyRepository;
use super::services::{CompanyNormalizeService, CreateCompanyService, NewCompany};

/// What happened to one spreadsheet row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompanyRowOutcome {
    Created,
    Unchanged,
    Updated,
    /// The row's company was deleted in favour of the tax number's owner
    Merged,
    /// Unknown id whose tax number already belongs to a company
    Skipped,
}

impl_domain_status_conversions!(CompanyRowOutcome {
    Created => "created",
    Unchanged => "unchanged",
    Updated => "updated",
    Merged => "merged",
    Skipped => "skipped",
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyBatchSummary {
    pub rows: Vec<(Uuid, CompanyRowOutcome)>,
}

impl CompanyBatchSummary {
    pub fn count(&self, outcome: CompanyRowOutcome) -> usize {
        self.rows.iter().filter(|(_, o)| *o == outcome).count()
    }
}

pub struct ApplyCompanyExcelBatchService {
    repository: Arc<dyn CompanyRepository>,
    creator: CreateCompanyService,
    normalizer: CompanyNormalizeService,
}

impl ApplyCompanyExcelBatchService {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self {
            creator: CreateCompanyService::new(Arc::clone(&repository)),
            repository,
            normalizer: CompanyNormalizeService::new(),
        }
    }

    pub fn apply(&self, rows: &[CompanyExport]) -> Result<CompanyBatchSummary> {
        let mut summary = CompanyBatchSummary::default();
        for row in rows {
            let outcome = self.apply_row(row)?;
            summary.rows.push((row.id, outcome));
        }
        Ok(summary)
    }

    fn apply_row(&self, row: &CompanyExport) -> Result<CompanyRowOutcome> {
        let tax_number = self.normalizer.required_tax_number(&row.tax_number)?;
        let existing = self.repository.get(row.id)?;
        let owner = self.repository.get_by_tax_number(&tax_number)?;

        let Some(existing) = existing else {
            if owner.is_some() {
                return Ok(CompanyRowOutcome::Skipped);
            }
            info!(name = %row.name, tax_number = %tax_number, "creating company from spreadsheet");
            self.creator.create(NewCompany::new(&row.name, &tax_number, CompanyRole::Client))?;
            return Ok(CompanyRowOutcome::Created);
        };

        if existing.name == row.name && existing.tax_number == tax_number {
            return Ok(CompanyRowOutcome::Unchanged);
        }

        match owner {
            Some(owner) if owner.id != existing.id => {
                warn!(
                    source_id = %existing.id,
                    target_id = %owner.id,
                    tax_number = %tax_number,
                    "tax number conflict in spreadsheet, merging companies"
                );
                self.repository.delete(existing.id)?;
                self.repository.update(&owner.with_name(&row.name))?;
                Ok(CompanyRowOutcome::Merged)
            }
            _ => {
                info!(id = %existing.id, name = %row.name, "updating company from spreadsheet");
                self.repository.update(&existing.with_name(&row.name).with_tax_number(tax_number))?;
                Ok(CompanyRowOutcome::Updated)
            }
        }
    }
}

//! Line amounts with VAT handling

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use crate::constants::MONEY_SCALE;
use crate::impl_domain_status_conversions;

/// Whether VAT on a cost can be deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    #[default]
    TaxDeductible,
    NonDeductible,
}

impl_domain_status_conversions!(TaxTreatment {
    TaxDeductible => "tax_deductible",
    NonDeductible => "non_deductible",
});

/// Polish VAT rates. `Exempt` ("zw") carries no rate at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VatRate {
    #[serde(rename = "23")]
    Vat23,
    #[serde(rename = "8")]
    Vat8,
    #[serde(rename = "5")]
    Vat5,
    #[serde(rename = "0")]
    Vat0,
    #[serde(rename = "zw")]
    Exempt,
}

impl_domain_status_conversions!(VatRate {
    Vat23 => "23",
    Vat8 => "8",
    Vat5 => "5",
    Vat0 => "0",
    Exempt => "zw",
});

impl VatRate {
    /// Rate as a fraction, `None` for exempt supplies.
    pub fn rate(self) -> Option<BigDecimal> {
        let percent = match self {
            Self::Vat23 => 23,
            Self::Vat8 => 8,
            Self::Vat5 => 5,
            Self::Vat0 => 0,
            Self::Exempt => return None,
        };
        Some(BigDecimal::from(percent) / BigDecimal::from(100))
    }
}

/// Net value of a line together with its tax treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: BigDecimal,
    pub vat_rate: VatRate,
    #[serde(default)]
    pub tax_treatment: TaxTreatment,
}

impl Amount {
    pub fn new(value: BigDecimal, vat_rate: VatRate) -> Self {
        Self { value, vat_rate, tax_treatment: TaxTreatment::default() }
    }

    pub fn with_tax_treatment(self, tax_treatment: TaxTreatment) -> Self {
        Self { tax_treatment, ..self }
    }

    fn is_deductible(&self) -> bool {
        self.tax_treatment == TaxTreatment::TaxDeductible
    }

    pub fn net(&self) -> BigDecimal {
        if self.is_deductible() {
            self.value.clone()
        } else {
            BigDecimal::zero()
        }
    }

    /// VAT rounded to grosze; zero for exempt or non-deductible lines.
    pub fn tax(&self) -> BigDecimal {
        if !self.is_deductible() {
            return BigDecimal::zero();
        }
        match self.vat_rate.rate() {
            Some(rate) => (&self.value * rate).round(MONEY_SCALE),
            None => BigDecimal::zero(),
        }
    }

    pub fn gross(&self) -> BigDecimal {
        &self.value + self.tax()
    }

    /// Portion of the value that cannot be booked as a deductible cost.
    pub fn non_tax_cost(&self) -> BigDecimal {
        if self.is_deductible() {
            BigDecimal::zero()
        } else {
            self.value.clone()
        }
    }
}

use serde::{Deserialize, Serialize};

use super::loan_type::LoanType;

/// Share of monthly income that may go towards installments.
pub const FOIR: f64 = 0.5;

pub const DEFAULT_TENURE_MONTHS: u32 = 36;

fn default_tenure() -> u32 {
    DEFAULT_TENURE_MONTHS
}

/// Figures entered in the eligibility form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityInput {
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default, rename = "existingEMI")]
    pub existing_emi: f64,
    #[serde(default)]
    pub loan_amount: f64,
    #[serde(default = "default_tenure", rename = "loanTenure")]
    pub loan_tenure_months: u32,
}

/// Outcome shown to the applicant. Amounts are rounded to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub is_eligible: bool,
    pub max_loan_amount: f64,
    #[serde(rename = "monthlyEMI")]
    pub monthly_emi: f64,
    #[serde(rename = "eligibleEMI")]
    pub eligible_emi: f64,
}

/// Converts an annual percentage rate into a monthly fraction.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0 / 100.0
}

fn growth(monthly_rate: f64, months: u32) -> f64 {
    (1.0 + monthly_rate).powf(f64::from(months))
}

/// Fixed monthly installment that repays `principal` over `months`.
pub fn amortized_payment(principal: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return principal / f64::from(months);
    }
    let factor = growth(monthly_rate, months);
    principal * monthly_rate * factor / (factor - 1.0)
}

/// Largest principal a `payment` per month can repay over `months`.
pub fn max_principal(payment: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate == 0.0 {
        return payment * f64::from(months);
    }
    let factor = growth(monthly_rate, months);
    payment * (factor - 1.0) / (monthly_rate * factor)
}

/// Estimates eligibility for the requested loan.
///
/// Returns `None` until there is something to compute: income and loan amount must be
/// positive, every figure finite, and the tenure at least one month.
pub fn assess(input: &EligibilityInput) -> Option<EligibilityResult> {
    let income = input.monthly_income;
    let existing_emi = input.existing_emi;
    let principal = input.loan_amount;
    let months = input.loan_tenure_months;

    if ![income, existing_emi, principal]
        .iter()
        .all(|value| value.is_finite())
    {
        return None;
    }
    if income <= 0.0 || principal <= 0.0 || months == 0 {
        return None;
    }

    let rate = monthly_rate(input.loan_type.annual_rate());
    let emi = amortized_payment(principal, rate, months);
    let max_emi_allowed = income * FOIR - existing_emi;
    let max_loan = if max_emi_allowed > 0.0 {
        max_principal(max_emi_allowed, rate, months)
    } else {
        0.0
    };

    Some(EligibilityResult {
        is_eligible: emi <= max_emi_allowed,
        max_loan_amount: max_loan.round(),
        monthly_emi: emi.round(),
        eligible_emi: max_emi_allowed.round().max(0.0),
    })
}

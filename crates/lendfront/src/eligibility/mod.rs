//! Loan eligibility estimation.
//!
//! An applicant may commit at most half of their monthly income (the FOIR cap) to
//! installments. The calculator compares the EMI of the requested loan against what
//! remains under that cap after existing obligations.

mod calculator;
mod loan_type;

pub use calculator::{
    amortized_payment, assess, max_principal, monthly_rate, EligibilityInput, EligibilityResult,
    DEFAULT_TENURE_MONTHS, FOIR,
};
pub use loan_type::{LoanType, FALLBACK_ANNUAL_RATE};

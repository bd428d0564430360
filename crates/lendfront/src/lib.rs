//! Lead-capture backend for a lending company's marketing site.
//!
//! Two flows live here: the loan [`eligibility`] estimator and the
//! [`invoices`] record service used by the admin back office.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod invoices;
pub mod telemetry;

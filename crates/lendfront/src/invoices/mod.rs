//! Payment receipt records: intake from the public receipt form and paginated
//! listing for the admin back office.

pub mod domain;
mod export;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    parse_timestamp, InvoiceId, InvoiceRecord, InvoiceSubmission, InvoiceValidationError,
};
pub use repository::{
    newest_first_page, InvoicePage, InvoiceRepository, PageRequest, RepositoryError,
};
pub use router::{invoice_router, AdminAccess};
pub use service::{InvoiceService, InvoiceServiceError};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{InvoiceId, InvoiceRecord, InvoiceSubmission, InvoiceValidationError};
use super::export;
use super::repository::{InvoicePage, InvoiceRepository, PageRequest, RepositoryError};
use crate::config::DEFAULT_MAX_PAGE_SIZE;

/// Service fronting the receipt store for the public form and the admin table.
pub struct InvoiceService<R> {
    repository: Arc<R>,
    max_page_size: u32,
    sequence: AtomicU64,
}

impl<R> InvoiceService<R>
where
    R: InvoiceRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            sequence: AtomicU64::new(1),
        }
    }

    /// Starts the id counter past the records already stored, so a restart within the
    /// same second cannot reissue a stored id.
    pub fn with_sequence_start(mut self, start: u64) -> Self {
        self.sequence = AtomicU64::new(start.max(1));
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size.max(1);
        self
    }

    /// Creation second followed by the service counter, so ids sort by creation.
    fn next_invoice_id(&self, now: DateTime<Utc>) -> InvoiceId {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let seconds = u32::try_from(now.timestamp()).unwrap_or(u32::MAX);
        InvoiceId(format!("{seconds:08x}{sequence:016x}"))
    }

    /// Validate and persist a receipt, returning the stored record.
    pub async fn create(
        &self,
        submission: InvoiceSubmission,
    ) -> Result<InvoiceRecord, InvoiceServiceError> {
        submission
            .validate()
            .inspect_err(|err| warn!(error = %err, "rejected invoice submission"))?;

        let now = Utc::now();
        let record = submission.into_record(self.next_invoice_id(now), now)?;
        let stored = self.repository.insert(record).await?;
        info!(invoice_id = %stored.id.0, receipt_no = %stored.receipt_no, "invoice saved");
        Ok(stored)
    }

    /// One page of receipts, newest first.
    pub async fn list(&self, request: PageRequest) -> Result<InvoicePage, InvoiceServiceError> {
        let request = request.capped(self.max_page_size);
        let total = self.repository.count().await?;
        let invoices = self
            .repository
            .page(request.offset(), request.limit as usize)
            .await?;
        Ok(InvoicePage::new(invoices, total, request))
    }

    pub async fn get(&self, id: &InvoiceId) -> Result<InvoiceRecord, InvoiceServiceError> {
        let record = self
            .repository
            .fetch(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Every receipt as CSV, newest first.
    pub async fn export_csv(&self) -> Result<Vec<u8>, InvoiceServiceError> {
        let total = usize::try_from(self.repository.count().await?).unwrap_or(usize::MAX);
        let records = self.repository.page(0, total).await?;
        let body = export::write_csv(&records)?;
        info!(rows = records.len(), "invoice export rendered");
        Ok(body)
    }
}

/// Error raised by the invoice service.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceServiceError {
    #[error(transparent)]
    Validation(#[from] InvoiceValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

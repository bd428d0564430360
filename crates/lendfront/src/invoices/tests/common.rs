use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::invoices::domain::{InvoiceId, InvoiceRecord, InvoiceSubmission};
use crate::invoices::repository::{newest_first_page, InvoiceRepository, RepositoryError};
use crate::invoices::{invoice_router, AdminAccess, InvoiceService};

pub(super) fn submission() -> InvoiceSubmission {
    InvoiceSubmission {
        receipt_type: Some("Loan EMI".to_string()),
        receipt_no: Some("RCPT-0001".to_string()),
        date: None,
        country_code: None,
        phone_code: None,
        mobile_no: Some("9876543210".to_string()),
        received_from: Some("Anita Sharma".to_string()),
        description: Some("March installment".to_string()),
        the_sum_of: Some("Twelve thousand five hundred only".to_string()),
        amount: Some(12_500.0),
        mode_of_payment: Some("UPI".to_string()),
        signature: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
    }
}

pub(super) fn numbered_submission(index: usize) -> InvoiceSubmission {
    InvoiceSubmission {
        receipt_no: Some(format!("RCPT-{index:04}")),
        ..submission()
    }
}

pub(super) fn submission_json() -> Value {
    serde_json::to_value(submission()).expect("submission serializes")
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<Vec<InvoiceRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

#[async_trait]
impl InvoiceRepository for MemoryRepository {
    async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    async fn page(&self, offset: usize, limit: usize) -> Result<Vec<InvoiceRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(newest_first_page(&guard, offset, limit))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.len() as u64)
    }

    async fn fetch(&self, id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }
}

pub(super) struct UnavailableRepository;

#[async_trait]
impl InvoiceRepository for UnavailableRepository {
    async fn insert(&self, _record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn page(&self, _offset: usize, _limit: usize) -> Result<Vec<InvoiceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(&self, _id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (Arc<InvoiceService<MemoryRepository>>, MemoryRepository) {
    let repository = MemoryRepository::default();
    let service = Arc::new(InvoiceService::new(Arc::new(repository.clone())));
    (service, repository)
}

pub(super) async fn seed(service: &InvoiceService<MemoryRepository>, count: usize) {
    for index in 1..=count {
        service
            .create(numbered_submission(index))
            .await
            .expect("seed submission succeeds");
    }
}

pub(super) fn router_with(
    service: Arc<InvoiceService<MemoryRepository>>,
    access: AdminAccess,
) -> axum::Router {
    invoice_router(service, access)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

//! End-to-end receipt intake through the public router: customers post receipts, the
//! back office pages through them.

mod common {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use lendfront::invoices::{
        newest_first_page, InvoiceId, InvoiceRecord, InvoiceRepository, RepositoryError,
    };

    #[derive(Default, Clone)]
    pub(super) struct VecRepository {
        records: Arc<Mutex<Vec<InvoiceRecord>>>,
    }

    #[async_trait]
    impl InvoiceRepository for VecRepository {
        async fn insert(&self, record: InvoiceRecord) -> Result<InvoiceRecord, RepositoryError> {
            self.records
                .lock()
                .expect("repository mutex poisoned")
                .push(record.clone());
            Ok(record)
        }

        async fn page(
            &self,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<InvoiceRecord>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(newest_first_page(&guard, offset, limit))
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            Ok(self.records.lock().expect("repository mutex poisoned").len() as u64)
        }

        async fn fetch(&self, id: &InvoiceId) -> Result<Option<InvoiceRecord>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard.iter().find(|record| &record.id == id).cloned())
        }
    }

    pub(super) fn receipt(index: usize) -> serde_json::Value {
        serde_json::json!({
            "receiptType": "Loan EMI",
            "receiptNo": format!("R-{index:03}"),
            "date": "2024-03-01",
            "countryCode": "IN",
            "phoneCode": "+91",
            "mobileNo": "9123456780",
            "receivedFrom": "Suresh Patel",
            "description": "Installment",
            "theSumOf": "Five thousand only",
            "amount": 5000,
            "modeOfPayment": "Cheque"
        })
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{receipt, VecRepository};
use lendfront::invoices::{invoice_router, AdminAccess, InvoiceService};
use serde_json::Value;
use tower::ServiceExt;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json payload")
}

#[tokio::test]
async fn posted_receipts_are_listed_newest_first() {
    let service = Arc::new(InvoiceService::new(Arc::new(VecRepository::default())));
    let router = invoice_router(service, AdminAccess::bearer("back-office"));

    for index in 1..=25 {
        let response = router
            .clone()
            .oneshot(
                Request::post("/invoices")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(receipt(index).to_string()))
                    .unwrap(),
            )
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = router
        .oneshot(
            Request::get("/invoices?page=2&limit=10")
                .header(header::AUTHORIZATION, "Bearer back-office")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["total"], 25);
    assert_eq!(payload["pages"], 3);
    assert_eq!(payload["currentPage"], 2);

    let receipts: Vec<String> = payload["invoices"]
        .as_array()
        .expect("invoice array")
        .iter()
        .filter_map(|invoice| invoice["receiptNo"].as_str().map(str::to_string))
        .collect();
    let expected: Vec<String> = (6..=15).rev().map(|i| format!("R-{i:03}")).collect();
    assert_eq!(receipts, expected);

    let first = &payload["invoices"][0];
    assert_eq!(first["date"], "2024-03-01T00:00:00Z");
}

#[tokio::test]
async fn incomplete_receipt_is_rejected_with_field_names() {
    let repository = VecRepository::default();
    let service = Arc::new(InvoiceService::new(Arc::new(repository)));
    let router = invoice_router(service, AdminAccess::open());

    let mut body = receipt(1);
    let fields = body.as_object_mut().expect("object payload");
    fields.remove("amount");
    fields.remove("receivedFrom");

    let response = router
        .oneshot(
            Request::post("/invoices")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = json_body(response).await;
    let message = payload["message"].as_str().expect("message");
    assert!(message.contains("amount"));
    assert!(message.contains("receivedFrom"));
}

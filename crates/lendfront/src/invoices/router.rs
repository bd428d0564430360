use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::domain::{InvoiceId, InvoiceSubmission, InvoiceValidationError};
use super::repository::{InvoiceRepository, PageRequest, RepositoryError};
use super::service::{InvoiceService, InvoiceServiceError};
use crate::config::AccessConfig;

/// Bearer token check for the admin back office routes. Open when no token is set.
#[derive(Debug, Clone, Default)]
pub struct AdminAccess {
    token: Option<Arc<str>>,
}

impl AdminAccess {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(Arc::from(token.into())),
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        match &config.admin_token {
            Some(token) => Self::bearer(token.clone()),
            None => Self::open(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.token.is_none()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };

        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match presented {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
            _ => {
                warn!("admin route called without a valid token");
                Err(message_response(
                    StatusCode::UNAUTHORIZED,
                    "admin token required".to_string(),
                ))
            }
        }
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .fold(0u8, |acc, (l, r)| acc | (l ^ r))
            == 0
}

pub(crate) struct InvoiceRoutes<R> {
    pub(crate) service: Arc<InvoiceService<R>>,
    pub(crate) access: AdminAccess,
}

impl<R> Clone for InvoiceRoutes<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            access: self.access.clone(),
        }
    }
}

/// Raw listing query; values are parsed leniently by [`PageRequest::from_query`].
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

/// Router builder exposing the receipt endpoints.
pub fn invoice_router<R>(service: Arc<InvoiceService<R>>, access: AdminAccess) -> Router
where
    R: InvoiceRepository + 'static,
{
    Router::new()
        .route("/invoices", post(create_handler::<R>).get(list_handler::<R>))
        .route("/invoices/export", get(export_handler::<R>))
        .route("/invoices/:invoice_id", get(fetch_handler::<R>))
        .with_state(InvoiceRoutes { service, access })
}

pub(crate) async fn create_handler<R>(
    State(routes): State<InvoiceRoutes<R>>,
    payload: Result<Json<InvoiceSubmission>, JsonRejection>,
) -> Response
where
    R: InvoiceRepository + 'static,
{
    let submission = match payload {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            let error = InvoiceValidationError::Malformed(rejection.body_text());
            warn!(error = %error, "malformed invoice payload");
            return message_response(StatusCode::BAD_REQUEST, error.to_string());
        }
    };

    match routes.service.create(submission).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn list_handler<R>(
    State(routes): State<InvoiceRoutes<R>>,
    headers: HeaderMap,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response
where
    R: InvoiceRepository + 'static,
{
    if let Err(denied) = routes.access.authorize(&headers) {
        return denied;
    }

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "malformed invoice listing query");
            return message_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let request = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());
    match routes.service.list(request).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(routes): State<InvoiceRoutes<R>>,
    headers: HeaderMap,
    Path(invoice_id): Path<String>,
) -> Response
where
    R: InvoiceRepository + 'static,
{
    if let Err(denied) = routes.access.authorize(&headers) {
        return denied;
    }

    match routes.service.get(&InvoiceId(invoice_id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn export_handler<R>(
    State(routes): State<InvoiceRoutes<R>>,
    headers: HeaderMap,
) -> Response
where
    R: InvoiceRepository + 'static,
{
    if let Err(denied) = routes.access.authorize(&headers) {
        return denied;
    }

    match routes.service.export_csv().await {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"invoices.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => service_error_response(err),
    }
}

fn service_error_response(err: InvoiceServiceError) -> Response {
    match err {
        InvoiceServiceError::Validation(err) => {
            message_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        InvoiceServiceError::Repository(RepositoryError::NotFound) => {
            message_response(StatusCode::NOT_FOUND, "invoice not found".to_string())
        }
        other => {
            error!(error = %other, "invoice storage failure");
            message_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "invoice storage unavailable".to_string(),
            )
        }
    }
}

fn message_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};

use super::domain::{SubmissionForm, SubmissionId};
use super::export::{ColumnSet, ExportError, ExportFormat, ExportOptions};
use super::repository::{RepositoryError, SubmissionRepository};
use super::service::{RegistrationError, RegistrationService};

/// Who may reach the staff endpoints (listing, CRUD, export).
#[derive(Debug, Clone, Default)]
pub enum AdminAccess {
    /// No token configured; staff endpoints are open.
    #[default]
    Open,
    /// Requests must carry `Authorization: Bearer <token>`.
    Bearer(Arc<str>),
}

impl AdminAccess {
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Bearer(Arc::from(token.trim())),
            _ => Self::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    fn permits(&self, headers: &HeaderMap) -> bool {
        let expected = match self {
            Self::Open => return true,
            Self::Bearer(token) => token,
        };

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| constant_time_eq(presented.trim(), expected))
    }
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    left.len() == right.len()
        && left
            .bytes()
            .zip(right.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

pub(crate) struct RegistrationState<R> {
    service: Arc<RegistrationService<R>>,
    access: AdminAccess,
}

impl<R> Clone for RegistrationState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            access: self.access.clone(),
        }
    }
}

/// Public intake form plus the token-guarded staff endpoints.
pub fn registration_router<R>(service: Arc<RegistrationService<R>>, access: AdminAccess) -> Router
where
    R: SubmissionRepository + 'static,
{
    Router::new()
        .route("/api/submit-form/", post(submit_handler::<R>))
        .route("/api/export-data/", get(export_handler::<R>))
        .route(
            "/api/submissions/",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/api/submissions/:id/",
            get(retrieve_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .with_state(RegistrationState { service, access })
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExportQuery {
    format: Option<String>,
    columns: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    search: Option<String>,
}

pub(crate) async fn submit_handler<R>(
    State(state): State<RegistrationState<R>>,
    payload: Result<Json<SubmissionForm>, JsonRejection>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let Json(form) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match state.service.submit(form) {
        Ok(record) => {
            let payload = json!({
                "status": "success",
                "message": "Form submitted successfully",
                "code": record.submission_code,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<R>(
    State(state): State<RegistrationState<R>>,
    headers: HeaderMap,
    Query(query): Query<ExportQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    if !state.access.permits(&headers) {
        return unauthorized();
    }

    let format = match ExportFormat::parse(query.format.as_deref().unwrap_or("json")) {
        Ok(format) => format,
        Err(err) => return error_response(err.into()),
    };
    let raw_columns = query.columns.unwrap_or_default();
    let Some(columns) = ColumnSet::parse(&raw_columns) else {
        return error_response(ExportError::UnsupportedColumns(raw_columns).into());
    };
    let options = ExportOptions {
        columns,
        search: query.search,
    };

    match state.service.export(format, &options) {
        Ok(document) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, document.content_type.to_string()),
                (header::CONTENT_DISPOSITION, document.content_disposition()),
            ],
            document.bytes,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R>(
    State(state): State<RegistrationState<R>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    if !state.access.permits(&headers) {
        return unauthorized();
    }

    match state.service.list(query.search.as_deref()) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<R>(
    State(state): State<RegistrationState<R>>,
    headers: HeaderMap,
    payload: Result<Json<SubmissionForm>, JsonRejection>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    if !state.access.permits(&headers) {
        return unauthorized();
    }
    let Json(form) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match state.service.create(form) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn retrieve_handler<R>(
    State(state): State<RegistrationState<R>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    if !state.access.permits(&headers) {
        return unauthorized();
    }

    match state.service.get(SubmissionId(id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R>(
    State(state): State<RegistrationState<R>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    payload: Result<Json<SubmissionForm>, JsonRejection>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    if !state.access.permits(&headers) {
        return unauthorized();
    }
    let Json(form) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(rejection),
    };

    match state.service.update(SubmissionId(id), form) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(state): State<RegistrationState<R>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    if !state.access.permits(&headers) {
        return unauthorized();
    }

    match state.service.delete(SubmissionId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn unauthorized() -> Response {
    let payload = json!({
        "status": "error",
        "message": "Authentication credentials were not provided.",
    });
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(payload),
    )
        .into_response()
}

fn malformed_body(rejection: JsonRejection) -> Response {
    let payload = json!({
        "status": "error",
        "message": "Validation failed",
        "errors": { "non_field_errors": [rejection.body_text()] },
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn error_response(err: RegistrationError) -> Response {
    let (status, payload) = match err {
        RegistrationError::Validation(errors) => (
            StatusCode::BAD_REQUEST,
            json!({
                "status": "error",
                "message": "Validation failed",
                "errors": errors,
            }),
        ),
        RegistrationError::Export(
            err @ (ExportError::UnsupportedFormat(_) | ExportError::UnsupportedColumns(_)),
        ) => (
            StatusCode::BAD_REQUEST,
            json!({ "status": "error", "message": err.to_string() }),
        ),
        RegistrationError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({ "status": "error", "message": "Not found." }),
        ),
        RegistrationError::Repository(RepositoryError::Conflict(code)) => (
            StatusCode::CONFLICT,
            json!({
                "status": "error",
                "message": format!("submission code {code} already exists"),
            }),
        ),
        RegistrationError::NotUniqueAfterGeneration { attempts } => {
            warn!(attempts, "giving up on tracking code assignment");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "status": "error",
                    "message": "Could not complete the submission right now, please retry.",
                }),
            )
        }
        other => {
            error!(error = %other, "registration request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "status": "error", "message": "Internal server error." }),
            )
        }
    };

    (status, Json(payload)).into_response()
}

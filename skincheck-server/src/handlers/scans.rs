use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use skincheck_core::{
    ScanError,
    domain::{
        CreateScanRequest, PageRequest, ScanPage, ScanRecord, SyncScansRequest,
    },
};

use crate::{
    auth::AuthenticatedUser,
    infra::{
        app_state::AppState,
        errors::{AppError, AppResult},
    },
};

/// Raw pagination parameters. Kept as strings so that non-numeric values
/// fall back to the defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListScansQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListScansQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            parse_query_int(self.page.as_deref()),
            parse_query_int(self.per_page.as_deref()),
        )
    }
}

fn parse_query_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

#[derive(Debug, Serialize)]
pub struct ScanListResponse {
    pub scans: Vec<ScanRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl From<ScanPage> for ScanListResponse {
    fn from(page: ScanPage) -> Self {
        Self {
            scans: page.items,
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub scan: ScanRecord,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub synced_count: usize,
    pub scans: Vec<ScanRecord>,
}

pub async fn list_scans(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<ListScansQuery>, QueryRejection>,
) -> AppResult<Json<ScanListResponse>> {
    let request = match query {
        Ok(Query(query)) => query.page_request(),
        Err(rejection) => {
            debug!(%rejection, "unreadable pagination query, using defaults");
            PageRequest::default()
        }
    };

    let page = state.scans.list(user.user_id, request).await?;
    Ok(Json(page.into()))
}

pub async fn create_scan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateScanRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = payload.map_err(invalid_body)?;

    let scan = state.ingestion.submit(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(ScanResponse { scan })))
}

pub async fn sync_scans(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<SyncScansRequest>, JsonRejection>,
) -> AppResult<Json<SyncResponse>> {
    let Json(request) = payload.map_err(invalid_body)?;

    let outcome = state.sync.sync(user.user_id, request).await?;
    Ok(Json(SyncResponse {
        synced_count: outcome.synced_count,
        scans: outcome.scans,
    }))
}

pub async fn get_scan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ScanResponse>> {
    let id = parse_scan_id(&id)?;
    let scan = state.scans.get(id, user.user_id).await?;
    Ok(Json(ScanResponse { scan }))
}

pub async fn delete_scan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_scan_id(&id)?;
    state.scans.delete(id, user.user_id).await?;

    info!(scan_id = %id, user_id = %user.user_id, "scan deleted");
    Ok(Json(json!({ "message": "Scan deleted successfully" })))
}

/// Ids that are not UUIDs cannot name a stored scan.
fn parse_scan_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| ScanError::scan_not_found().into())
}

/// Malformed JSON is a 400. Anything else (an oversized body, a dropped
/// connection) keeps the status axum assigned.
fn invalid_body(rejection: JsonRejection) -> AppError {
    debug!(%rejection, "rejected request body");
    match rejection {
        JsonRejection::JsonSyntaxError(_)
        | JsonRejection::JsonDataError(_)
        | JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request("Request body must be valid JSON")
        }
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::new(StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE)
        }
        other => AppError::new(other.status(), other.body_text()),
    }
}

const BODY_TOO_LARGE: &str = "Request body is too large";

#[cfg(test)]
mod tests {
    use super::*;
    use skincheck_core::domain::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

    fn query(page: Option<&str>, per_page: Option<&str>) -> ListScansQuery {
        ListScansQuery {
            page: page.map(str::to_string),
            per_page: per_page.map(str::to_string),
        }
    }

    #[test]
    fn non_numeric_pagination_falls_back_to_defaults() {
        let request = query(Some("abc"), Some("")).page_request();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn pagination_is_clamped() {
        let request = query(Some("3"), Some("500")).page_request();
        assert_eq!(request.page(), 3);
        assert_eq!(request.per_page(), MAX_PER_PAGE);

        let request = query(Some("-2"), Some("0")).page_request();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), DEFAULT_PER_PAGE);
    }

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_scan_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Scan not found");
    }
}

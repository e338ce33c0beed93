//! Claim endpoints: upload, CRUD, download and OCR analysis

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        FromRequestParts, Multipart, Path, Query, State,
    },
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::middleware::Admitted;
use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiResponse, Json};
use crate::domain::analysis::ClaimAnalysisResult;
use crate::domain::claim::{Claim, ClaimFilter, ClaimId, ClaimStatus};
use crate::infrastructure::services::ClaimDetails;

const MAX_PAGE_SIZE: i64 = 100;

/// Claim id taken from the route, rejected with the error envelope
#[derive(Debug, Clone, Copy)]
pub struct ClaimPath(pub ClaimId);

impl<S: Send + Sync> FromRequestParts<S> for ClaimPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| ApiError::bad_request(e.body_text()))?;

        Ok(ClaimPath(ClaimId::new(id)))
    }
}

/// Claimant details, shared by the JSON body and the upload query string
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClaimRequest {
    #[validate(length(min = 1, message = "claimant_name must not be empty"))]
    pub claimant_name: String,
    #[validate(length(min = 1, message = "claim_type must not be empty"))]
    pub claim_type: String,
    #[validate(range(min = 0.0, message = "amount must not be negative"))]
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl ClaimRequest {
    fn into_details(self) -> Result<ClaimDetails, ApiError> {
        let request = Self {
            claimant_name: self.claimant_name.trim().to_string(),
            claim_type: self.claim_type.trim().to_string(),
            amount: self.amount,
            description: self.description.filter(|d| !d.trim().is_empty()),
        };

        request
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        Ok(ClaimDetails {
            claimant_name: request.claimant_name,
            claim_type: request.claim_type,
            amount: request.amount,
            description: request.description,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListClaimsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub claimant_name: Option<String>,
}

impl ListClaimsQuery {
    fn into_filter(self) -> Result<ClaimFilter, ApiError> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(ApiError::bad_request("skip must be >= 0"));
        }

        let limit = self.limit.unwrap_or(10);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let mut filter = ClaimFilter::new().with_page(skip as usize, limit as usize);

        if let Some(status) = self.status.filter(|s| !s.trim().is_empty()) {
            let status = status.parse::<ClaimStatus>().map_err(|_| {
                ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "INVALID_STATUS_FILTER",
                    format!("Invalid status filter: {}", status),
                )
            })?;
            filter = filter.with_status(status);
        }

        if let Some(name) = self.claimant_name.filter(|n| !n.trim().is_empty()) {
            filter = filter.with_claimant_name(name.trim());
        }

        Ok(filter)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

fn query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    result
        .map(|Query(value)| value)
        .map_err(|e| ApiError::bad_request(e.body_text()))
}

/// POST /upload
pub async fn upload_claim(
    Admitted { identity }: Admitted,
    State(state): State<AppState>,
    details: Result<Query<ClaimRequest>, QueryRejection>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Claim>>), ApiError> {
    let details = query(details)?.into_details()?;
    let (file_name, bytes) = read_file_field(&mut multipart).await?;

    debug!(
        origin = %identity.origin(),
        file_name = %file_name,
        size = bytes.len(),
        "Upload received"
    );

    let claim = state
        .claims
        .create_from_upload(details, &file_name, bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(claim))))
}

/// First multipart field named `file`
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", uuid::Uuid::new_v4()));
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok((file_name, bytes));
    }

    Err(ApiError::bad_request("Missing multipart field 'file'"))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err, "Upload exceeded request body limit");
        return ApiError::new(StatusCode::BAD_REQUEST, "FILE_TOO_LARGE", err.body_text());
    }

    ApiError::bad_request(format!("Failed to read multipart body: {}", err.body_text()))
}

/// POST /claims
pub async fn create_claim(
    _: Admitted,
    State(state): State<AppState>,
    Json(request): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Claim>>), ApiError> {
    let claim = state.claims.create(request.into_details()?).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(claim))))
}

/// GET /claims
pub async fn list_claims(
    _: Admitted,
    State(state): State<AppState>,
    params: Result<Query<ListClaimsQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Claim>>>, ApiError> {
    let filter = query(params)?.into_filter()?;
    let claims = state.claims.list(filter).await?;
    Ok(Json(ApiResponse::success(claims)))
}

/// GET /claims/search?q=
pub async fn search_claims(
    _: Admitted,
    State(state): State<AppState>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Claim>>>, ApiError> {
    let SearchQuery { q } = query(params)?;
    let claims = state.claims.search(&q).await?;
    Ok(Json(ApiResponse::success(claims)))
}

/// GET /claims/{id}
pub async fn get_claim(
    _: Admitted,
    State(state): State<AppState>,
    ClaimPath(id): ClaimPath,
) -> Result<Json<ApiResponse<Claim>>, ApiError> {
    let claim = state.claims.get(id).await?;
    Ok(Json(ApiResponse::success(claim)))
}

/// PATCH /claims/{id}/status
pub async fn update_claim_status(
    _: Admitted,
    State(state): State<AppState>,
    ClaimPath(id): ClaimPath,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<Claim>>, ApiError> {
    let status = request.status.parse::<ClaimStatus>()?;
    let claim = state.claims.update_status(id, status).await?;
    Ok(Json(ApiResponse::success(claim)))
}

/// DELETE /claims/{id}
pub async fn delete_claim(
    _: Admitted,
    State(state): State<AppState>,
    ClaimPath(id): ClaimPath,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state.claims.delete(id).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "deleted": true,
        "id": id,
    }))))
}

/// GET /download/{id}
pub async fn download_document(
    _: Admitted,
    State(state): State<AppState>,
    ClaimPath(id): ClaimPath,
) -> Result<Response, ApiError> {
    let file = state
        .claims
        .document(id)
        .await?
        .ok_or_else(|| ApiError::file_not_found("Document file not found for this claim."))?;

    let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
        warn!(claim_id = %id, path = %file.path.display(), error = %e, "Failed to read document");
        ApiError::file_not_found("Document file not found for this claim.")
    })?;

    let content_type = HeaderValue::from_str(&file.mime)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        file.file_name.replace(['"', '\\'], "_")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// POST /analyze/{id}
pub async fn analyze_claim(
    _: Admitted,
    State(state): State<AppState>,
    ClaimPath(id): ClaimPath,
) -> Result<Json<ApiResponse<ClaimAnalysisResult>>, ApiError> {
    let result = state.ingestion.ingest(id).await?;

    info!(
        claim_id = %id,
        fields_updated = !result.updated_fields.is_empty(),
        "Claim analyzed"
    );

    Ok(Json(ApiResponse::success(result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, claim_type: &str, amount: f64) -> ClaimRequest {
        ClaimRequest {
            claimant_name: name.to_string(),
            claim_type: claim_type.to_string(),
            amount,
            description: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_claim_request_validation() {
        let details = request(" Jane ", "Auto", 10.0).into_details().unwrap();
        assert_eq!(details.claimant_name, "Jane");
        assert_eq!(details.description, None);

        assert_eq!(
            request("", "Auto", 10.0).into_details().unwrap_err().code(),
            "BAD_REQUEST"
        );
        assert!(request("   ", "Auto", 10.0).into_details().is_err());
        assert!(request("Jane", "Auto", -1.0).into_details().is_err());
    }

    #[test]
    fn test_list_query_defaults() {
        let filter = ListClaimsQuery::default().into_filter().unwrap();
        assert_eq!(filter, ClaimFilter::new());
    }

    #[test]
    fn test_list_query_bounds() {
        let out_of_range = |skip, limit| ListClaimsQuery {
            skip: Some(skip),
            limit: Some(limit),
            ..Default::default()
        };

        assert!(out_of_range(-1, 10).into_filter().is_err());
        assert!(out_of_range(0, 0).into_filter().is_err());
        assert!(out_of_range(0, 101).into_filter().is_err());
        assert_eq!(out_of_range(5, 100).into_filter().unwrap().limit, 100);
    }

    #[test]
    fn test_list_query_status_filter() {
        let filter = ListClaimsQuery {
            status: Some("under_review".to_string()),
            claimant_name: Some(" doe ".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();

        assert_eq!(filter.status, Some(ClaimStatus::UnderReview));
        assert_eq!(filter.claimant_name.as_deref(), Some("doe"));

        let err = ListClaimsQuery {
            status: Some("Escalated".to_string()),
            ..Default::default()
        }
        .into_filter()
        .unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS_FILTER");
    }
}

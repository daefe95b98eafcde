use crate::schemas::{
    api_error, service_error, ApiError, ApiResponse, AppState,
};
use crate::session::Auth;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{AdminReviewSummary, Page, ReviewStatusCounts};
use model::entities::review::ReviewStatus;
use model::entities::user;
use model::review_query::ReviewFilter;
use serde::{Deserialize, Serialize};
use service::auth::require_admin;
use service::{AuthContext, DEFAULT_PAGE_SIZE};
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for the moderation listing
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ReviewSearchQuery {
    /// `pending`, `approved` or `rejected`; empty or `all` lists every status
    pub status: Option<String>,
    /// Only reviews with exactly this many stars
    #[validate(range(min = 1, max = 5))]
    pub star: Option<i32>,
    /// Matches review content or author name
    pub keyword: Option<String>,
    /// Zero-based page index (default: 0)
    #[validate(range(max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 5)
    #[validate(range(min = 1, max = 100))]
    pub size: Option<u64>,
}

/// Target status of a review
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct StatusQuery {
    /// `pending`, `approved` or `rejected`
    pub status: String,
}

/// Number of reviews changed by a bulk operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovedCount {
    pub approved: u64,
}

fn parse_status(raw: &str) -> Result<ReviewStatus, ApiError> {
    match raw.trim().to_lowercase().as_str() {
        "pending" => Ok(ReviewStatus::Pending),
        "approved" => Ok(ReviewStatus::Approved),
        "rejected" => Ok(ReviewStatus::Rejected),
        other => Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown review status '{}'", other),
            "INVALID_STATUS",
        )),
    }
}

/// `None` means no status filter.
fn parse_status_filter(raw: Option<&str>) -> Result<Option<ReviewStatus>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => parse_status(value).map(Some),
    }
}

/// Resolves the caller and requires the admin role. Shared by every admin endpoint.
pub(crate) async fn ensure_admin(
    state: &AppState,
    auth: &AuthContext,
) -> Result<user::Model, ApiError> {
    let admin = require_admin(&state.db, auth).await.map_err(service_error)?;
    debug!("Admin {} authorized", admin.id);
    Ok(admin)
}

/// List reviews for moderation
#[utoipa::path(
    get,
    path = "/admin/api/reviews",
    tag = "moderation",
    params(ReviewSearchQuery),
    responses(
        (status = 200, description = "Reviews retrieved successfully", body = ApiResponse<Page<AdminReviewSummary>>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Valid(Query(query)): Valid<Query<ReviewSearchQuery>>,
) -> Result<Json<ApiResponse<Page<AdminReviewSummary>>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let mut filter = ReviewFilter::new()
        .star(query.star)
        .keyword(query.keyword.clone());
    if let Some(status) = parse_status_filter(query.status.as_deref())? {
        filter = filter.status(status);
    }

    let page = state
        .moderation
        .list_reviews(
            filter,
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await
        .map_err(service_error)?;

    info!("Listed {} of {} reviews for moderation", page.items.len(), page.total_count);
    Ok(Json(ApiResponse::ok(page, "Reviews retrieved successfully")))
}

/// Get a single review
#[utoipa::path(
    get,
    path = "/admin/api/reviews/{review_id}",
    tag = "moderation",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review retrieved successfully", body = ApiResponse<AdminReviewSummary>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_review(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(review_id): Path<i32>,
) -> Result<Json<ApiResponse<AdminReviewSummary>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let review = state
        .moderation
        .get_review(review_id)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::ok(review, "Review retrieved successfully")))
}

/// Change the status of a review
#[utoipa::path(
    put,
    path = "/admin/api/reviews/{review_id}/status",
    tag = "moderation",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
        StatusQuery,
    ),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<AdminReviewSummary>),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn update_review_status(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(review_id): Path<i32>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<AdminReviewSummary>>, ApiError> {
    ensure_admin(&state, &auth).await?;
    let status = parse_status(&query.status)?;

    let review = state
        .moderation
        .update_status(review_id, status)
        .await
        .map_err(service_error)?;

    info!("Review {} is now {}", review_id, status.as_str());
    Ok(Json(ApiResponse::ok(review, "Review status updated successfully")))
}

/// Approve every pending review
#[utoipa::path(
    post,
    path = "/admin/api/reviews/approve-all",
    tag = "moderation",
    responses(
        (status = 200, description = "Pending reviews approved", body = ApiResponse<ApprovedCount>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn approve_all_reviews(
    State(state): State<AppState>,
    Auth(auth): Auth,
) -> Result<Json<ApiResponse<ApprovedCount>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let approved = state
        .moderation
        .approve_all_pending()
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::ok(
        ApprovedCount { approved },
        format!("{} reviews approved", approved),
    )))
}

/// Delete a review
#[utoipa::path(
    delete,
    path = "/admin/api/reviews/{review_id}",
    tag = "moderation",
    params(
        ("review_id" = i32, Path, description = "Review ID"),
    ),
    responses(
        (status = 200, description = "Review deleted", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Review not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_review(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(review_id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    state
        .moderation
        .delete_review(review_id)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::ok(
        format!("Review {} deleted", review_id),
        "Review deleted successfully",
    )))
}

/// Count reviews per status
#[utoipa::path(
    get,
    path = "/admin/api/reviews/counts",
    tag = "moderation",
    responses(
        (status = 200, description = "Counts per status", body = ApiResponse<ReviewStatusCounts>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn review_counts(
    State(state): State<AppState>,
    Auth(auth): Auth,
) -> Result<Json<ApiResponse<ReviewStatusCounts>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let counts = state
        .moderation
        .count_by_status()
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::ok(counts, "Review counts retrieved successfully")))
}

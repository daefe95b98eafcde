use crate::handlers::admin_reviews::ensure_admin;
use crate::schemas::{api_error, service_error, ApiError, ApiResponse, AppState};
use crate::session::Auth;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{Page, UserSummary};
use model::entities::user::{UserRole, UserStatus};
use serde::Deserialize;
use service::{UserFilter, DEFAULT_PAGE_SIZE};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for the admin user listing
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct UserSearchQuery {
    /// Matches name or email
    pub keyword: Option<String>,
    /// `customer` or `admin`
    #[serde(alias = "roleType")]
    pub role: Option<String>,
    /// `active` or `banned`
    pub status: Option<String>,
    /// Zero-based page index (default: 0)
    #[validate(range(max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 5)
    #[validate(range(min = 1, max = 100))]
    pub size: Option<u64>,
}

/// Target status of an account
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct UserStatusQuery {
    /// `active` or `banned`
    pub status: String,
}

/// Empty or `all` means no filter.
fn parse_filter<T>(
    raw: Option<&str>,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => parse(value).map(Some).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown {} '{}'", what, value),
                "INVALID_STATUS",
            )
        }),
    }
}

/// List user accounts
#[utoipa::path(
    get,
    path = "/admin/api/users",
    tag = "users",
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Page<UserSummary>>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn list_users(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Valid(Query(query)): Valid<Query<UserSearchQuery>>,
) -> Result<Json<ApiResponse<Page<UserSummary>>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let filter = UserFilter::new()
        .keyword(query.keyword.clone())
        .role(parse_filter(query.role.as_deref(), UserRole::parse, "role")?)
        .status(parse_filter(query.status.as_deref(), UserStatus::parse, "user status")?);
    let page = state
        .users
        .list_users(
            filter,
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await
        .map_err(service_error)?;

    Ok(Json(ApiResponse::ok(page, "Users retrieved successfully")))
}

/// Get a single account
#[utoipa::path(
    get,
    path = "/admin/api/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserSummary>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_user(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let user = state.users.get_user(user_id).await.map_err(service_error)?;
    Ok(Json(ApiResponse::ok(user, "User retrieved successfully")))
}

/// Ban or unban an account
#[utoipa::path(
    put,
    path = "/admin/api/users/{user_id}/status",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        UserStatusQuery,
    ),
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<UserSummary>),
        (status = 400, description = "Unknown status or own account", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn update_user_status(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(user_id): Path<i32>,
    Query(query): Query<UserStatusQuery>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let admin = ensure_admin(&state, &auth).await?;
    let Some(status) = UserStatus::parse(&query.status) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown user status '{}'", query.status),
            "INVALID_STATUS",
        ));
    };

    let user = state
        .users
        .update_status(&admin, user_id, status)
        .await
        .map_err(service_error)?;

    info!("Admin {} set user {} to {}", admin.id, user_id, status.as_str());
    Ok(Json(ApiResponse::ok(user, "User status updated successfully")))
}

use crate::handlers::admin_reviews::ensure_admin;
use crate::schemas::{api_error, service_error, ApiError, ApiResponse, AppState};
use crate::session::Auth;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{CafeDetail, CafeInput, CafeSummary, DishInput, DishSummary, Page};
use model::entities::cafe::CafeStatus;
use serde::Deserialize;
use service::{CafeFilter, DEFAULT_PAGE_SIZE};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Query parameters for the admin cafe listing
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct CafeSearchQuery {
    /// Matches cafe name or address
    pub keyword: Option<String>,
    /// `opening` or `closed`; empty or `all` lists both
    pub status: Option<String>,
    /// Zero-based page index (default: 0)
    #[validate(range(max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 5)
    #[validate(range(min = 1, max = 100))]
    pub size: Option<u64>,
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<CafeStatus>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => CafeStatus::parse(value).map(Some).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown cafe status '{}'", value),
                "INVALID_STATUS",
            )
        }),
    }
}

/// List cafes for administration
#[utoipa::path(
    get,
    path = "/admin/api/cafes",
    tag = "cafes",
    params(CafeSearchQuery),
    responses(
        (status = 200, description = "Cafes retrieved successfully", body = ApiResponse<Page<CafeSummary>>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn list_cafes(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Valid(Query(query)): Valid<Query<CafeSearchQuery>>,
) -> Result<Json<ApiResponse<Page<CafeSummary>>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let filter = CafeFilter::new()
        .status(parse_status_filter(query.status.as_deref())?)
        .keyword(query.keyword.clone());
    let page = state
        .cafe_admin
        .list_cafes(
            filter,
            query.page.unwrap_or(0),
            query.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await
        .map_err(service_error)?;

    Ok(Json(ApiResponse::ok(page, "Cafes retrieved successfully")))
}

/// Get a cafe with its menu
#[utoipa::path(
    get,
    path = "/admin/api/cafes/{cafe_id}",
    tag = "cafes",
    params(
        ("cafe_id" = i32, Path, description = "Cafe ID"),
    ),
    responses(
        (status = 200, description = "Cafe retrieved successfully", body = ApiResponse<CafeDetail>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_cafe(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(cafe_id): Path<i32>,
) -> Result<Json<ApiResponse<CafeDetail>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let cafe = state.cafe_admin.get_cafe(cafe_id).await.map_err(service_error)?;
    Ok(Json(ApiResponse::ok(cafe, "Cafe retrieved successfully")))
}

/// Create a cafe and its menu
#[utoipa::path(
    post,
    path = "/admin/api/cafes",
    tag = "cafes",
    request_body = CafeInput,
    responses(
        (status = 201, description = "Cafe created", body = ApiResponse<CafeDetail>),
        (status = 400, description = "Invalid cafe data", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, input))]
pub async fn create_cafe(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Json(input): Json<CafeInput>,
) -> Result<(StatusCode, Json<ApiResponse<CafeDetail>>), ApiError> {
    let admin = ensure_admin(&state, &auth).await?;

    let cafe = state.cafe_admin.create_cafe(input).await.map_err(service_error)?;
    info!("Admin {} created cafe {}", admin.id, cafe.cafe.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(cafe, "Cafe created successfully")),
    ))
}

/// Update a cafe and optionally replace its menu
#[utoipa::path(
    put,
    path = "/admin/api/cafes/{cafe_id}",
    tag = "cafes",
    params(
        ("cafe_id" = i32, Path, description = "Cafe ID"),
    ),
    request_body = CafeInput,
    responses(
        (status = 200, description = "Cafe updated", body = ApiResponse<CafeDetail>),
        (status = 400, description = "Invalid cafe data", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, input))]
pub async fn update_cafe(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(cafe_id): Path<i32>,
    Json(input): Json<CafeInput>,
) -> Result<Json<ApiResponse<CafeDetail>>, ApiError> {
    let admin = ensure_admin(&state, &auth).await?;

    let cafe = state
        .cafe_admin
        .update_cafe(cafe_id, input)
        .await
        .map_err(service_error)?;
    info!("Admin {} updated cafe {}", admin.id, cafe_id);
    Ok(Json(ApiResponse::ok(cafe, "Cafe updated successfully")))
}

/// Delete a cafe with its dishes and reviews
#[utoipa::path(
    delete,
    path = "/admin/api/cafes/{cafe_id}",
    tag = "cafes",
    params(
        ("cafe_id" = i32, Path, description = "Cafe ID"),
    ),
    responses(
        (status = 200, description = "Cafe deleted", body = ApiResponse<String>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn delete_cafe(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(cafe_id): Path<i32>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let admin = ensure_admin(&state, &auth).await?;

    state.cafe_admin.delete_cafe(cafe_id).await.map_err(service_error)?;
    info!("Admin {} deleted cafe {}", admin.id, cafe_id);
    Ok(Json(ApiResponse::ok(
        format!("Cafe {} deleted", cafe_id),
        "Cafe deleted successfully",
    )))
}

/// Get a single dish
#[utoipa::path(
    get,
    path = "/admin/api/dishes/{dish_id}",
    tag = "cafes",
    params(
        ("dish_id" = i32, Path, description = "Dish ID"),
    ),
    responses(
        (status = 200, description = "Dish retrieved successfully", body = ApiResponse<DishSummary>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_dish(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(dish_id): Path<i32>,
) -> Result<Json<ApiResponse<DishSummary>>, ApiError> {
    ensure_admin(&state, &auth).await?;

    let dish = state.cafe_admin.get_dish(dish_id).await.map_err(service_error)?;
    Ok(Json(ApiResponse::ok(dish, "Dish retrieved successfully")))
}

/// Edit a single dish
#[utoipa::path(
    put,
    path = "/admin/api/dishes/{dish_id}",
    tag = "cafes",
    params(
        ("dish_id" = i32, Path, description = "Dish ID"),
    ),
    request_body = DishInput,
    responses(
        (status = 200, description = "Dish updated", body = ApiResponse<DishSummary>),
        (status = 400, description = "Invalid dish data", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, input))]
pub async fn update_dish(
    State(state): State<AppState>,
    Auth(auth): Auth,
    Path(dish_id): Path<i32>,
    Json(input): Json<DishInput>,
) -> Result<Json<ApiResponse<DishSummary>>, ApiError> {
    let admin = ensure_admin(&state, &auth).await?;

    let dish = state
        .cafe_admin
        .update_dish(dish_id, input)
        .await
        .map_err(service_error)?;
    info!("Admin {} updated dish {}", admin.id, dish_id);
    Ok(Json(ApiResponse::ok(dish, "Dish updated successfully")))
}

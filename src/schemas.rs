use axum::{http::StatusCode, response::Json};
use common::{
    AdminReviewSummary, CafeDetail, CafeInput, CafeSummary, DishInput, DishSummary,
    ProfileUpdate, ReviewStatusCounts, ReviewSummary, UserSummary,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use service::{
    AccountService, AuthError, CafeAdminService, CafeDetailService, ModerationService,
    ServiceError, UploadStore, UserAdminService,
};
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Logged-in sessions keyed by cookie value
    pub sessions: SessionStore,
    /// Destination of admin image uploads
    pub uploads: UploadStore,
    pub cafes: CafeDetailService,
    pub accounts: AccountService,
    pub moderation: ModerationService,
    pub cafe_admin: CafeAdminService,
    pub users: UserAdminService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, sessions: SessionStore, uploads: UploadStore) -> Self {
        Self {
            cafes: CafeDetailService::new(db.clone()),
            accounts: AccountService::new(db.clone()),
            moderation: ModerationService::new(db.clone()),
            cafe_admin: CafeAdminService::new(db.clone()),
            users: UserAdminService::new(db.clone()),
            db,
            sessions,
            uploads,
        }
    }
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }
}

/// Plain acknowledgement with a human readable message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (status, Json(ErrorResponse::new(error, code)))
}

/// Maps a service failure to its HTTP status and error code.
pub fn service_error(err: ServiceError) -> ApiError {
    match err {
        ServiceError::Auth(AuthError::NotAuthenticated) => {
            warn!("Rejected request: not logged in");
            api_error(StatusCode::UNAUTHORIZED, err.to_string(), "NOT_AUTHENTICATED")
        }
        ServiceError::Auth(AuthError::UnknownUser(ref email)) => {
            warn!("Rejected request: no user record for principal {}", email);
            api_error(StatusCode::UNAUTHORIZED, err.to_string(), "USER_NOT_FOUND")
        }
        ServiceError::Auth(AuthError::Forbidden) => {
            api_error(StatusCode::FORBIDDEN, err.to_string(), "FORBIDDEN")
        }
        ServiceError::Auth(AuthError::Banned(ref email)) => {
            warn!("Rejected request from banned account {}", email);
            api_error(StatusCode::FORBIDDEN, "This account has been banned", "ACCOUNT_BANNED")
        }
        ServiceError::Validation(message) => {
            api_error(StatusCode::BAD_REQUEST, message, "VALIDATION_ERROR")
        }
        ServiceError::NotFound(message) => api_error(StatusCode::NOT_FOUND, message, "NOT_FOUND"),
        ServiceError::Conflict(message) => api_error(StatusCode::CONFLICT, message, "CONFLICT"),
        ServiceError::Storage(ref e) => {
            error!("Storage failure: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.to_string(),
                "STORAGE_ERROR",
            )
        }
        ServiceError::Database(ref e) => {
            error!("Database failure: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "DATABASE_ERROR",
            )
        }
        ServiceError::PasswordHash(ref e) => {
            error!("Password hashing failure: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "INTERNAL_ERROR",
            )
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::reviews::submit_review,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::get_profile,
        crate::handlers::auth::update_profile,
        crate::handlers::upload::upload_image,
        crate::handlers::admin_reviews::list_reviews,
        crate::handlers::admin_reviews::get_review,
        crate::handlers::admin_reviews::update_review_status,
        crate::handlers::admin_reviews::approve_all_reviews,
        crate::handlers::admin_reviews::delete_review,
        crate::handlers::admin_reviews::review_counts,
        crate::handlers::admin_cafes::list_cafes,
        crate::handlers::admin_cafes::get_cafe,
        crate::handlers::admin_cafes::create_cafe,
        crate::handlers::admin_cafes::update_cafe,
        crate::handlers::admin_cafes::delete_cafe,
        crate::handlers::admin_cafes::get_dish,
        crate::handlers::admin_cafes::update_dish,
        crate::handlers::admin_users::list_users,
        crate::handlers::admin_users::get_user,
        crate::handlers::admin_users::update_user_status,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::auth::UserResponse>,
            ApiResponse<AdminReviewSummary>,
            ApiResponse<ReviewStatusCounts>,
            ApiResponse<crate::handlers::admin_reviews::ApprovedCount>,
            ApiResponse<CafeDetail>,
            ApiResponse<DishSummary>,
            ApiResponse<UserSummary>,
            ErrorResponse,
            MessageResponse,
            HealthResponse,
            CafeSummary,
            DishSummary,
            ReviewSummary,
            AdminReviewSummary,
            ReviewStatusCounts,
            CafeDetail,
            CafeInput,
            DishInput,
            UserSummary,
            ProfileUpdate,
            crate::handlers::reviews::ReviewForm,
            crate::handlers::auth::RegisterForm,
            crate::handlers::auth::LoginForm,
            crate::handlers::auth::UserResponse,
            crate::handlers::admin_reviews::ApprovedCount,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "reviews", description = "Review submission"),
        (name = "auth", description = "Registration and sessions"),
        (name = "upload", description = "Admin image upload"),
        (name = "moderation", description = "Admin review moderation"),
        (name = "cafes", description = "Admin cafe and menu management"),
        (name = "users", description = "Admin account management"),
    ),
    info(
        title = "Cafe Finder API",
        description = "JSON endpoints of the Cafe Finder web application",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

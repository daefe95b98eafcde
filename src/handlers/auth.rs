use crate::schemas::{
    api_error, service_error, ApiError, ApiResponse, AppState, MessageResponse,
};
use crate::session::{expired_session_cookie, session_cookie, Auth, SESSION_COOKIE};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use common::{ProfileUpdate, UserSummary};
use model::entities::user;
use serde::{Deserialize, Serialize};
use service::{accounts::user_summary, auth::resolve_user, Registration};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

/// Registration form fields
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    /// At least 8 characters
    pub password: String,
}

/// Login form fields
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Public view of a user account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// `customer` or `admin`
    pub role: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            role: model.role.as_str().to_string(),
            name: model.name,
            email: model.email,
        }
    }
}

/// Register a customer account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid name, email or password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    debug!("Registering new account");
    let registration = Registration::new(&form.name, &form.email, &form.password);

    let user = state
        .accounts
        .register(registration)
        .await
        .map_err(service_error)?;

    info!("Registered user {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(user), "User registered successfully")),
    ))
}

/// Log in and receive a session cookie
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in, session cookie set", body = ApiResponse<UserResponse>),
        (status = 401, description = "Wrong email or password", body = ErrorResponse),
        (status = 403, description = "Account is banned", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, jar, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Json<ApiResponse<UserResponse>>), ApiError> {
    let Some(user) = state
        .accounts
        .authenticate(&form.email, &form.password)
        .await
        .map_err(service_error)?
    else {
        warn!("Login failed");
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
            "INVALID_CREDENTIALS",
        ));
    };

    let session_id = state.sessions.create(&user.email).await;
    info!("User {} logged in", user.id);

    Ok((
        jar.add(session_cookie(session_id)),
        Json(ApiResponse::ok(UserResponse::from(user), "Logged in successfully")),
    ))
}

/// End the current session
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session ended", body = MessageResponse)
    )
)]
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value()).await;
        debug!("Session removed");
    }

    (
        jar.remove(expired_session_cookie()),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// Profile of the logged-in user
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserSummary>),
        (status = 401, description = "Not logged in or unknown user", body = ErrorResponse),
        (status = 403, description = "Account is banned", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth))]
pub async fn get_profile(
    State(state): State<AppState>,
    Auth(auth): Auth,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = resolve_user(&state.db, &auth).await.map_err(service_error)?;
    Ok(Json(ApiResponse::ok(user_summary(user), "Profile retrieved successfully")))
}

/// Change the name or date of birth of the logged-in user
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "auth",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserSummary>),
        (status = 400, description = "Invalid name or date of birth", body = ErrorResponse),
        (status = 401, description = "Not logged in or unknown user", body = ErrorResponse),
        (status = 403, description = "Account is banned", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, body))]
pub async fn update_profile(
    State(state): State<AppState>,
    Auth(auth): Auth,
    body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let user = resolve_user(&state.db, &auth).await.map_err(service_error)?;
    let Json(update) = body.map_err(|rejection| {
        warn!("Malformed profile update from user {}: {}", user.id, rejection);
        api_error(StatusCode::BAD_REQUEST, rejection.body_text(), "VALIDATION_ERROR")
    })?;

    let profile = state
        .accounts
        .update_profile(user, update)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::ok(profile, "Profile updated successfully")))
}

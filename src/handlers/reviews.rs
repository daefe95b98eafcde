use crate::schemas::{api_error, service_error, ApiError, AppState, MessageResponse};
use crate::session::Auth;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::Json,
    Form,
};
use serde::{Deserialize, Serialize};
use service::auth::resolve_user;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Shown after a successful submission; reviews wait for moderation.
pub const REVIEW_SUBMITTED_MESSAGE: &str = "レビューを投稿しました。承認をお待ちください。";

/// Review form fields
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReviewForm {
    /// Rating from 1 to 5
    pub star: i32,
    /// Review text, up to 2000 characters
    pub content: String,
}

/// Submit a review for a cafe
#[utoipa::path(
    post,
    path = "/cafes/{cafe_id}/reviews",
    tag = "reviews",
    params(
        ("cafe_id" = i32, Path, description = "Cafe ID"),
    ),
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Review stored and awaiting approval", body = MessageResponse),
        (status = 400, description = "Invalid star or content", body = ErrorResponse),
        (status = 401, description = "Not logged in or unknown user", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, auth, form))]
pub async fn submit_review(
    State(state): State<AppState>,
    Path(cafe_id): Path<i32>,
    Auth(auth): Auth,
    form: Result<Form<ReviewForm>, FormRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering submit_review for cafe_id: {}", cafe_id);

    // Authentication is checked before the body so anonymous callers always get 401
    let user = resolve_user(&state.db, &auth).await.map_err(service_error)?;

    let Form(form) = form.map_err(|rejection| {
        warn!("Malformed review form from user {}: {}", user.id, rejection);
        api_error(StatusCode::BAD_REQUEST, rejection.body_text(), "VALIDATION_ERROR")
    })?;
    debug!("User {} submits a {} star review for cafe {}", user.id, form.star, cafe_id);

    let review = state
        .cafes
        .save_review(cafe_id, &user, form.star, &form.content)
        .await
        .map_err(service_error)?;

    info!("Review {} submitted for cafe {}", review.id, cafe_id);
    Ok(Json(MessageResponse {
        message: REVIEW_SUBMITTED_MESSAGE.to_string(),
    }))
}

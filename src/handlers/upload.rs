use crate::schemas::{service_error, AppState};
use crate::session::Auth;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use service::{auth::require_admin, ServiceError};
use tracing::{debug, error, info, instrument, warn};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Request bodies above this size are rejected before the handler runs.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

/// Upload an image (admin only)
///
/// Returns the generated file name as plain text.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart form with a `file` field"),
    responses(
        (status = 200, description = "Stored file name", body = String, content_type = "text/plain"),
        (status = 400, description = "No file or empty file"),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not an administrator", body = ErrorResponse),
        (status = 500, description = "The file could not be written")
    )
)]
#[instrument(skip(state, auth, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    Auth(auth): Auth,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, Response> {
    let admin = require_admin(&state.db, &auth)
        .await
        .map_err(|e| service_error(e).into_response())?;

    let mut multipart = multipart.map_err(|rejection| {
        warn!("Upload is not a multipart request: {}", rejection);
        bad_request("Please select a file")
    })?;

    let mut upload = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e);
                return Err(bad_request("Malformed upload"));
            }
        };
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed to read uploaded file: {}", e);
            bad_request("Malformed upload")
        })?;
        upload = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        warn!("Upload without a file field");
        return Err(bad_request("Please select a file"));
    };

    match state.uploads.store(file_name.as_deref(), &bytes).await {
        Ok(stored) => {
            info!("Admin {} uploaded {}", admin.id, stored);
            Ok(stored)
        }
        Err(ServiceError::Validation(message)) => {
            warn!("Rejected upload: {}", message);
            Err(bad_request(&message))
        }
        Err(e) => {
            error!("Upload failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("Upload failed: {}", e)).into_response())
        }
    }
}

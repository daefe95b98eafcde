use crate::handlers::{
    admin_cafes::{create_cafe, delete_cafe, get_cafe, get_dish, list_cafes, update_cafe, update_dish},
    admin_reviews::{
        approve_all_reviews, delete_review, get_review, list_reviews, review_counts,
        update_review_status,
    },
    admin_users::{get_user, list_users, update_user_status},
    auth::{get_profile, login, logout, register, update_profile},
    cafes::{cafe_detail, cafe_list, reviews_fragment},
    health::health_check,
    pages::{app_script, login_page, register_page},
    reviews::submit_review,
    upload::{upload_image, MAX_UPLOAD_BYTES},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let images = ServeDir::new(state.uploads.root());

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Public cafe pages
        .route("/", get(cafe_list))
        .route("/cafes", get(cafe_list))
        .route("/cafes/:cafe_id", get(cafe_detail))
        .route("/cafes/:cafe_id/reviews-fragment", get(reviews_fragment))
        .route("/cafes/:cafe_id/reviews", post(submit_review))
        // Accounts and sessions
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/assets/app.js", get(app_script))
        // Admin upload
        .route(
            "/api/upload",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .nest_service("/images", images)
        // Admin review moderation
        .route("/admin/api/reviews", get(list_reviews))
        .route("/admin/api/reviews/counts", get(review_counts))
        .route("/admin/api/reviews/approve-all", post(approve_all_reviews))
        .route(
            "/admin/api/reviews/:review_id",
            get(get_review).delete(delete_review),
        )
        .route("/admin/api/reviews/:review_id/status", put(update_review_status))
        // Admin cafe and menu management
        .route("/admin/api/cafes", get(list_cafes).post(create_cafe))
        .route(
            "/admin/api/cafes/:cafe_id",
            get(get_cafe).put(update_cafe).delete(delete_cafe),
        )
        .route("/admin/api/dishes/:dish_id", get(get_dish).put(update_dish))
        // Admin account management
        .route("/admin/api/users", get(list_users))
        .route("/admin/api/users/:user_id", get(get_user))
        .route("/admin/api/users/:user_id/status", put(update_user_status))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

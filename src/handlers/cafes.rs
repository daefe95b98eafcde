use crate::schemas::AppState;
use crate::session::Auth;
use crate::views::{self, CafeListTemplate, DetailTemplate, PageError, ReviewListTemplate};
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Html,
};
use axum_valid::{Valid, ValidRejection};
use serde::{Deserialize, Deserializer};
use service::DEFAULT_PAGE_SIZE;
use tracing::{debug, error, info, instrument, trace, warn};
use validator::Validate;

/// An empty `star=` (the "All" choice of the filter form) means no filter.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Query parameters of the public cafe listing
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CafeListQuery {
    /// Matches cafe name or address
    pub q: Option<String>,
    /// Zero-based page index (default: 0)
    #[validate(range(max = 10000))]
    pub page: Option<u64>,
    /// Cafes per page (default: 10)
    #[validate(range(min = 1, max = 100))]
    pub size: Option<u64>,
}

const CAFE_LIST_PAGE_SIZE: u64 = 10;

/// Page queries that failed to parse or validate get the HTML error view
/// instead of a plain-text rejection.
type PageQuery<T> = Result<Valid<Query<T>>, ValidRejection<QueryRejection>>;

fn page_query<T>(query: PageQuery<T>) -> Result<T, PageError> {
    match query {
        Ok(Valid(Query(query))) => Ok(query),
        Err(rejection) => {
            warn!("Rejected page query: {}", rejection);
            Err(views::error_page(
                StatusCode::BAD_REQUEST,
                "The page parameters are not valid",
            ))
        }
    }
}

fn cafe_path(path: Result<Path<i32>, PathRejection>) -> Result<i32, PageError> {
    match path {
        Ok(Path(cafe_id)) => Ok(cafe_id),
        Err(rejection) => {
            debug!("Rejected cafe path: {}", rejection);
            Err(views::error_page(StatusCode::NOT_FOUND, "Cafe not found"))
        }
    }
}

/// Query parameters of the cafe page and its review fragment
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewPageQuery {
    /// Zero-based page index (default: 0)
    #[validate(range(max = 10000))]
    pub page: Option<u64>,
    /// Reviews per page (default: 5)
    #[validate(range(min = 1, max = 100))]
    pub size: Option<u64>,
    /// Only show reviews with exactly this many stars
    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, max = 5))]
    pub star: Option<i32>,
}

impl ReviewPageQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(0)
    }

    fn size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

async fn render_review_list(
    state: &AppState,
    cafe_id: i32,
    query: &ReviewPageQuery,
) -> Result<String, PageError> {
    let page = state
        .cafes
        .get_reviews(cafe_id, query.star, query.page(), query.size())
        .await
        .map_err(|e| {
            error!("Failed to load reviews for cafe {}: {}", cafe_id, e);
            views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Reviews could not be loaded")
        })?;

    views::render(&ReviewListTemplate::new(cafe_id, page, query.star))
}

/// Public listing of open cafes
#[instrument(skip(state, auth, query))]
pub async fn cafe_list(
    State(state): State<AppState>,
    Auth(auth): Auth,
    query: PageQuery<CafeListQuery>,
) -> Result<Html<String>, PageError> {
    let query = page_query(query)?;

    let page = state
        .cafes
        .list_cafes(
            query.q.clone(),
            query.page.unwrap_or(0),
            query.size.unwrap_or(CAFE_LIST_PAGE_SIZE),
        )
        .await
        .map_err(|e| {
            error!("Failed to list cafes: {}", e);
            views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "Cafes could not be loaded")
        })?;
    debug!("Listing {} of {} cafes", page.items.len(), page.total_count);

    let keyword = query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());
    views::render(&CafeListTemplate::new(page, keyword, auth.is_authenticated())).map(Html)
}

/// Cafe detail page with menu and approved reviews
#[instrument(skip(state, auth, path, query))]
pub async fn cafe_detail(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    Auth(auth): Auth,
    query: PageQuery<ReviewPageQuery>,
) -> Result<Html<String>, PageError> {
    let cafe_id = cafe_path(path)?;
    let query = page_query(query)?;
    trace!("Entering cafe_detail for cafe_id: {}", cafe_id);

    let cafe = match state.cafes.get_cafe_detail(cafe_id).await {
        Ok(Some(cafe)) => cafe,
        Ok(None) => {
            warn!("Cafe {} not found", cafe_id);
            return Err(views::error_page(StatusCode::NOT_FOUND, "Cafe not found"));
        }
        Err(e) => {
            error!("Failed to load cafe {}: {}", cafe_id, e);
            return Err(views::error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "The cafe could not be loaded",
            ));
        }
    };

    let dishes = state.cafes.get_dishes(cafe_id).await.map_err(|e| {
        error!("Failed to load dishes for cafe {}: {}", cafe_id, e);
        views::error_page(StatusCode::INTERNAL_SERVER_ERROR, "The menu could not be loaded")
    })?;
    debug!("Cafe {} has {} dishes", cafe_id, dishes.len());

    let reviews_html = render_review_list(&state, cafe_id, &query).await?;
    let page = DetailTemplate::new(
        cafe,
        dishes,
        reviews_html,
        query.star,
        auth.is_authenticated(),
    );

    info!("Rendered detail page for cafe {}", cafe_id);
    views::render(&page).map(Html)
}

/// Review list partial used for paging without a full reload
#[instrument(skip(state, path, query))]
pub async fn reviews_fragment(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    query: PageQuery<ReviewPageQuery>,
) -> Result<Html<String>, PageError> {
    let cafe_id = cafe_path(path)?;
    let query = page_query(query)?;
    trace!("Entering reviews_fragment for cafe_id: {}", cafe_id);
    render_review_list(&state, cafe_id, &query).await.map(Html)
}

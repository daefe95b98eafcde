//! Server-rendered HTML views.

use askama::Template;
use axum::{http::StatusCode, response::Html};
use common::{CafeSummary, DishSummary, Page, ReviewSummary};
use tracing::error;

const MAX_STARS: i32 = 5;

pub type PageError = (StatusCode, Html<String>);

fn star_label(star: i32) -> String {
    let filled = star.clamp(0, MAX_STARS) as usize;
    let empty = MAX_STARS as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

pub struct DishRow {
    pub name: String,
    pub price: String,
    pub description: String,
    pub has_description: bool,
}

impl From<DishSummary> for DishRow {
    fn from(dish: DishSummary) -> Self {
        let description = dish.description.unwrap_or_default();
        let mut price = dish.price;
        price.rescale(2);
        Self {
            name: dish.name,
            price: price.to_string(),
            has_description: !description.is_empty(),
            description,
        }
    }
}

pub struct ReviewRow {
    pub author_name: String,
    pub stars: String,
    pub content: String,
    pub created_on: String,
}

impl From<ReviewSummary> for ReviewRow {
    fn from(review: ReviewSummary) -> Self {
        Self {
            author_name: review.author_name,
            stars: star_label(review.star),
            content: review.content,
            created_on: review.created_on.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub struct PageLink {
    pub index: u64,
    pub number: u64,
    pub current: bool,
}

/// Paging links shared by the listing templates.
pub struct Pager {
    pub total_count: u64,
    pub page_size: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_index: u64,
    pub next_index: u64,
    pub pages: Vec<PageLink>,
}

impl Pager {
    fn new<T>(page: &Page<T>) -> Self {
        Self {
            total_count: page.total_count,
            page_size: page.page_size,
            has_previous: page.has_previous(),
            has_next: page.has_next(),
            previous_index: page.previous_index(),
            next_index: page.next_index(),
            pages: (0..page.total_pages())
                .map(|index| PageLink {
                    index,
                    number: index + 1,
                    current: index == page.page_index,
                })
                .collect(),
        }
    }
}

pub struct StarOption {
    pub value: i32,
    pub label: String,
    pub selected: bool,
}

/// The review list partial, served alone for in-page pagination.
#[derive(Template)]
#[template(path = "review_list.html")]
pub struct ReviewListTemplate {
    pub cafe_id: i32,
    pub reviews: Vec<ReviewRow>,
    /// Query suffix that keeps the star filter across page links
    pub star_query: String,
    pub pager: Pager,
}

impl ReviewListTemplate {
    pub fn new(cafe_id: i32, page: Page<ReviewSummary>, star: Option<i32>) -> Self {
        Self {
            cafe_id,
            star_query: star.map(|s| format!("&star={}", s)).unwrap_or_default(),
            pager: Pager::new(&page),
            reviews: page.items.into_iter().map(ReviewRow::from).collect(),
        }
    }
}

pub struct CafeCard {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub image: String,
    pub has_image: bool,
    pub stars: String,
    pub average_star: String,
    pub review_count: u64,
}

fn format_average(average: Option<f64>) -> String {
    average
        .map(|avg| format!("{:.1}", avg))
        .unwrap_or_else(|| "-".to_string())
}

impl From<CafeSummary> for CafeCard {
    fn from(cafe: CafeSummary) -> Self {
        let image = cafe.image.unwrap_or_default();
        Self {
            id: cafe.id,
            name: cafe.name,
            address: cafe.address,
            has_image: !image.is_empty(),
            image,
            stars: star_label(cafe.average_star.map_or(0, |avg| avg.round() as i32)),
            average_star: format_average(cafe.average_star),
            review_count: cafe.review_count,
        }
    }
}

/// Public cafe listing with keyword search.
#[derive(Template)]
#[template(path = "cafe_list.html")]
pub struct CafeListTemplate {
    pub cafes: Vec<CafeCard>,
    pub keyword: String,
    /// Query suffix that keeps the keyword across page links
    pub keyword_query: String,
    pub pager: Pager,
    pub logged_in: bool,
}

impl CafeListTemplate {
    pub fn new(page: Page<CafeSummary>, keyword: Option<String>, logged_in: bool) -> Self {
        let keyword = keyword.unwrap_or_default();
        Self {
            keyword_query: if keyword.is_empty() {
                String::new()
            } else {
                format!("&q={}", urlencoding::encode(&keyword))
            },
            keyword,
            pager: Pager::new(&page),
            cafes: page.items.into_iter().map(CafeCard::from).collect(),
            logged_in,
        }
    }
}

/// Only same-site paths are followed after login.
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    /// Where the browser goes after a successful login
    pub next: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub next: String,
}

#[derive(Template)]
#[template(path = "details.html")]
pub struct DetailTemplate {
    pub cafe_id: i32,
    pub name: String,
    pub address: String,
    pub description: String,
    pub has_description: bool,
    pub opening_hours: String,
    pub has_opening_hours: bool,
    pub image: String,
    pub has_image: bool,
    pub review_count: u64,
    pub average_star: String,
    pub dishes: Vec<DishRow>,
    pub star_options: Vec<StarOption>,
    pub no_star_filter: bool,
    pub logged_in: bool,
    /// Pre-rendered [`ReviewListTemplate`]
    pub reviews_html: String,
}

impl DetailTemplate {
    pub fn new(
        cafe: CafeSummary,
        dishes: Vec<DishSummary>,
        reviews_html: String,
        star: Option<i32>,
        logged_in: bool,
    ) -> Self {
        let description = cafe.description.unwrap_or_default();
        let opening_hours = cafe.opening_hours.unwrap_or_default();
        let image = cafe.image.unwrap_or_default();
        let star_options = (1..=MAX_STARS)
            .rev()
            .map(|value| StarOption {
                value,
                label: star_label(value),
                selected: star == Some(value),
            })
            .collect();

        Self {
            cafe_id: cafe.id,
            name: cafe.name,
            address: cafe.address,
            has_description: !description.is_empty(),
            description,
            has_opening_hours: !opening_hours.is_empty(),
            opening_hours,
            has_image: !image.is_empty(),
            image,
            review_count: cafe.review_count,
            average_star: format_average(cafe.average_star),
            dishes: dishes.into_iter().map(DishRow::from).collect(),
            star_options,
            no_star_filter: star.is_none(),
            logged_in,
            reviews_html,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub reason: String,
    pub message: String,
}

/// Error page with the given status. Falls back to bare markup if the
/// template itself fails.
pub fn error_page(status: StatusCode, message: &str) -> PageError {
    let template = ErrorTemplate {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.to_string(),
    };
    match template.render() {
        Ok(body) => (status, Html(body)),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            (status, Html(format!("<h1>{}</h1>", status)))
        }
    }
}

pub fn render<T: Template>(template: &T) -> Result<String, PageError> {
    template.render().map_err(|e| {
        error!("Failed to render template: {}", e);
        error_page(StatusCode::INTERNAL_SERVER_ERROR, "The page could not be rendered")
    })
}

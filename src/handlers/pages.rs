//! Account pages and the script they share with the cafe pages.

use crate::views::{self, LoginTemplate, PageError, RegisterTemplate};
use axum::{
    extract::Query,
    http::header,
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use tracing::instrument;

/// Client script for review paging and the fetch-based forms.
const APP_SCRIPT: &str = include_str!("../../assets/app.js");

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Path to open after logging in
    pub next: Option<String>,
}

/// Login form page
#[instrument]
pub async fn login_page(Query(query): Query<NextQuery>) -> Result<Html<String>, PageError> {
    let page = LoginTemplate {
        next: views::safe_next(query.next.as_deref()),
    };
    views::render(&page).map(Html)
}

/// Sign-up form page
#[instrument]
pub async fn register_page(Query(query): Query<NextQuery>) -> Result<Html<String>, PageError> {
    let page = RegisterTemplate {
        next: views::safe_next(query.next.as_deref()),
    };
    views::render(&page).map(Html)
}

pub async fn app_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        APP_SCRIPT,
    )
}

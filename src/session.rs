//! Cookie sessions and the per-request authentication context.

use std::convert::Infallible;
use std::time::Duration;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use moka::future::Cache;
use service::AuthContext;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::schemas::AppState;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "cafe_session";

const MAX_SESSIONS: u64 = 10_000;

/// Maps opaque session ids to the email of the logged-in user.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Cache<String, String>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_live(ttl)
            .build();
        Self { sessions }
    }

    /// Starts a session for `email` and returns its id.
    pub async fn create(&self, email: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions
            .insert(session_id.clone(), email.to_string())
            .await;
        debug!("Session started for {}", email);
        session_id
    }

    pub async fn principal(&self, session_id: &str) -> Option<String> {
        self.sessions.get(session_id).await
    }

    pub async fn remove(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
    }
}

/// Cookie handed out at login.
pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie that clears the session cookie in the browser.
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Authentication context of the current request.
///
/// Never rejects: a missing or stale session simply yields an anonymous
/// context, and handlers decide whether that is acceptable.
#[derive(Debug, Clone)]
pub struct Auth(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            trace!("No session cookie on request");
            return Ok(Auth(AuthContext::anonymous()));
        };

        match state.sessions.principal(cookie.value()).await {
            Some(email) => Ok(Auth(AuthContext::for_principal(email))),
            None => {
                debug!("Session cookie does not match a live session");
                Ok(Auth(AuthContext::anonymous()))
            }
        }
    }
}

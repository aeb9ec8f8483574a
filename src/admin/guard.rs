//! Route guard for the admin pages.
//!
//! The guard only looks at whether a token is present. A stale or forged
//! token gets through and is caught later, when the quiz API answers 401.

use axum::{
    extract::Request,
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::session::{CookieSession, SessionStore};

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

#[derive(Debug)]
pub enum Access {
    Granted(SecretString),
    /// Where to send the visitor instead.
    Redirect(String),
}

pub fn check(session: &impl SessionStore, location: &Uri) -> Access {
    match session.get() {
        Some(token) => Access::Granted(token),
        None => {
            let from = location
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| location.path());
            Access::Redirect(login_location(from))
        }
    }
}

/// Login page URL that remembers `from`.
pub fn login_location(from: &str) -> String {
    match serde_urlencoded::to_string([("from", from)]) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_owned(),
    }
}

/// Where to go after a successful login.
///
/// Only local admin pages are accepted so the login form can't be turned into
/// an open redirect.
pub fn return_target(from: Option<&str>) -> &str {
    match from {
        Some(path)
            if path.starts_with("/admin/")
                && !path.starts_with(LOGIN_PATH)
                && !path.contains("//")
                && !path.contains('\\') =>
        {
            path
        }
        _ => DASHBOARD_PATH,
    }
}

/// Bearer token of the admin behind the current request.
pub struct AdminToken(SecretString);

impl AdminToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }

    pub fn secret(&self) -> &SecretString {
        &self.0
    }
}

impl Clone for AdminToken {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.0.expose_secret().to_owned()))
    }
}

/// Middleware for guarded routes. On success the token is available to
/// handlers as `Extension<AdminToken>`.
pub async fn require_session(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let session = CookieSession::new(jar, false);
    match check(&session, request.uri()) {
        Access::Granted(token) => {
            request.extensions_mut().insert(AdminToken::new(token));
            next.run(request).await
        }
        Access::Redirect(location) => {
            debug!("No admin session for {}, redirecting", request.uri());
            Redirect::to(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::session::MemorySession;

    #[test]
    fn absent_token_redirects_with_origin() {
        let uri: Uri = "/admin/questions?tab=all".parse().unwrap();
        match check(&MemorySession::default(), &uri) {
            Access::Redirect(location) => assert_eq!(
                location,
                "/admin/login?from=%2Fadmin%2Fquestions%3Ftab%3Dall"
            ),
            Access::Granted(_) => panic!("visitor without token was let in"),
        }
    }

    #[test]
    fn any_token_is_granted() {
        let session = MemorySession::with_token(SecretString::from("forged".to_owned()));
        let uri: Uri = "/admin/dashboard".parse().unwrap();
        match check(&session, &uri) {
            Access::Granted(token) => assert_eq!(token.expose_secret(), "forged"),
            Access::Redirect(_) => panic!("token holder was redirected"),
        }
    }

    #[test]
    fn return_target_accepts_local_admin_paths_only() {
        assert_eq!(return_target(Some("/admin/questions")), "/admin/questions");
        assert_eq!(return_target(None), DASHBOARD_PATH);
        assert_eq!(return_target(Some("https://evil.example")), DASHBOARD_PATH);
        assert_eq!(return_target(Some("//evil.example/admin/")), DASHBOARD_PATH);
        assert_eq!(return_target(Some("/admin//evil.example")), DASHBOARD_PATH);
        assert_eq!(return_target(Some("/admin/login")), DASHBOARD_PATH);
        assert_eq!(return_target(Some("/metrics")), DASHBOARD_PATH);
    }
}

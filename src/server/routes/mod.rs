mod auth;
mod dashboard;
mod questions;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;

use crate::admin::guard::login_location;
use crate::admin::{AdminToken, CookieSession, SessionStore, Workspaces};

pub use auth::{login_router, logout_router};
pub use dashboard::dashboard_router;
pub use questions::questions_router;

/// How the session cookie is issued.
#[derive(Clone, Copy, Debug, Default)]
pub struct CookiePolicy {
    pub secure: bool,
}

/// Forgets the session and sends the admin to the login page, remembering
/// `back_to` for after the next login.
fn reauthenticate(
    workspaces: &Workspaces,
    token: &AdminToken,
    jar: CookieJar,
    policy: CookiePolicy,
    back_to: &str,
) -> Response {
    workspaces.close(token.secret());
    let mut session = CookieSession::new(jar, policy.secure);
    session.clear();
    (session.into_jar(), Redirect::to(&login_location(back_to))).into_response()
}

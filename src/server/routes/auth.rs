use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::CookieJar;
use secrecy::SecretString;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::CookiePolicy;
use crate::admin::guard::{return_target, DASHBOARD_PATH, LOGIN_PATH};
use crate::admin::{AdminToken, CookieSession, SessionStore, Workspaces};
use crate::api::{ApiError, QuestionApi};
use crate::server::app::AppState;

#[derive(Deserialize)]
struct LoginQuery {
    from: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
    #[serde(default)]
    from: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
struct LoginPage {
    from: String,
    error: Option<&'static str>,
}

async fn login_page(jar: CookieJar, Query(query): Query<LoginQuery>) -> Response {
    if CookieSession::new(jar, false).get().is_some() {
        return Redirect::to(DASHBOARD_PATH).into_response();
    }
    LoginPage {
        from: query.from.unwrap_or_default(),
        error: None,
    }
    .into_response()
}

async fn login_submit(
    State(api): State<Arc<dyn QuestionApi>>,
    State(policy): State<CookiePolicy>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let password = SecretString::from(form.password);
    let failure = match api
        .login(&form.username, &password, &CancellationToken::new())
        .await
    {
        Ok(token) => {
            info!("Admin {} logged in", form.username);
            let mut session = CookieSession::new(jar, policy.secure);
            session.set(token);
            let target = return_target(form.from.as_deref());
            return (session.into_jar(), Redirect::to(target)).into_response();
        }
        Err(ApiError::Unauthorized) => "Invalid username or password",
        Err(e) => {
            error!("Login error: {e}");
            "An error occurred. Please try again."
        }
    };
    LoginPage {
        from: form.from.unwrap_or_default(),
        error: Some(failure),
    }
    .into_response()
}

async fn logout(
    State(workspaces): State<Workspaces>,
    State(policy): State<CookiePolicy>,
    Extension(token): Extension<AdminToken>,
    jar: CookieJar,
) -> Response {
    workspaces.close(token.secret());
    let mut session = CookieSession::new(jar, policy.secure);
    session.clear();
    info!("Admin logged out");
    (session.into_jar(), Redirect::to(LOGIN_PATH)).into_response()
}

pub fn login_router(state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login_submit))
        .with_state(state)
}

pub fn logout_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/logout", post(logout))
        .with_state(state)
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{extract::FromRef, http::StatusCode, middleware, routing::get, Router};
use routes::{dashboard_router, login_router, logout_router, questions_router, CookiePolicy};
use reqwest::Url;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::admin::guard::{require_session, LOGIN_PATH};
use crate::admin::Workspaces;
use crate::api::{QuestionApi, QuestionClient};
use crate::config::Settings;
use crate::telemetry::encode_metrics;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub api: Arc<dyn QuestionApi>,
    pub workspaces: Workspaces,
    pub cookies: CookiePolicy,
}

impl AppState {
    pub fn new(api: Arc<dyn QuestionApi>, cookies: CookiePolicy) -> Self {
        Self {
            api,
            workspaces: Workspaces::default(),
            cookies,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .merge(dashboard_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(logout_router(state.clone()))
        .route_layer(middleware::from_fn(require_session));

    Router::new()
        .route("/metrics", get(metrics))
        .merge(login_router(state))
        .merge(guarded)
        .fallback(|| async {
            tracing::debug!("Fallback");
            Redirect::to(LOGIN_PATH)
        })
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let base = Url::parse(&settings.api_url)
        .with_context(|| format!("Invalid API URL {}", settings.api_url))?;
    let client = QuestionClient::new(base).context("Failed to build API client")?;
    let cookies = CookiePolicy {
        secure: settings.secure_cookies,
    };
    let state = AppState {
        workspaces: Workspaces::new(Duration::from_secs(settings.session_idle_minutes * 60)),
        ..AppState::new(Arc::new(client), cookies)
    };
    let app = build_router(state);
    let listener = TcpListener::bind(&settings.listen)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen))?;

    tracing::info!(
        "Serving admin UI on {} for API {}",
        settings.listen,
        settings.api_url
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics() -> Response {
    match encode_metrics() {
        Ok((content_type, buf)) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(buf))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

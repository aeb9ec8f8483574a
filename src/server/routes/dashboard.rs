use askama::Template;
use askama_web::WebTemplate;
use axum::{routing::get, Router};

use crate::server::app::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
struct DashboardPage {
    active: &'static str,
}

async fn dashboard() -> DashboardPage {
    DashboardPage {
        active: "dashboard",
    }
}

pub fn dashboard_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .with_state(state)
}

pub mod app;
mod routes;

pub use app::{build_router, run_server, AppState};
pub use routes::CookiePolicy;

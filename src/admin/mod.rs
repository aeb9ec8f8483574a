//! Session-gated question management: everything between the browser and
//! the quiz API that is not HTTP plumbing.

pub mod form;
pub mod guard;
pub mod notification;
pub mod session;
pub mod workspace;

pub use guard::{require_session, AdminToken};
pub use session::{CookieSession, MemorySession, SessionStore};
pub use workspace::{Flow, Workspace, Workspaces};

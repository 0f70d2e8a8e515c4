//! Snippetbox web layer: forms and validation, server-side sessions, page
//! templates, middleware, and the HTTP handlers wired into one router.

pub mod error;
pub mod forms;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod session;
pub mod snippets;
pub mod state;
pub mod templates;
pub mod users;
pub mod validator;

pub use error::AppError;
pub use routes::router;
pub use state::{AppState, AppStateInner};

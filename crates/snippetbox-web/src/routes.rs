//! Route table.
//!
//! ## Routes
//!
//! - `GET /static/*` - Static assets
//! - `GET /ping` - Liveness
//! - `GET /` - Latest snippets
//! - `GET /snippet/view/{id}` - One snippet
//! - `GET|POST /snippet/create` - Create form / submit (signed in)
//! - `GET|POST /user/signup`, `GET|POST /user/login`
//! - `POST /user/logout` (signed in)

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{authenticate, require_authentication, secure_headers, verify_csrf};
use crate::snippets;
use crate::state::AppState;
use crate::users;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/snippet/create",
            get(snippets::snippet_create).post(snippets::snippet_create_post),
        )
        .route("/user/logout", post(users::user_logout_post))
        .route_layer(middleware::from_fn(require_authentication));

    let dynamic = Router::new()
        .route("/", get(snippets::home))
        .route("/snippet/view/{id}", get(snippets::snippet_view))
        .route("/user/signup", get(users::user_signup).post(users::user_signup_post))
        .route("/user/login", get(users::user_login).post(users::user_login_post))
        .merge(protected)
        .layer(middleware::from_fn(verify_csrf))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(state.sessions.clone());

    Router::new()
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .route("/ping", get(ping))
        .merge(dynamic)
        .fallback(not_found)
        .layer(middleware::from_fn(secure_headers))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

async fn ping() -> &'static str {
    "OK"
}

async fn not_found() -> AppError {
    AppError::NotFound
}

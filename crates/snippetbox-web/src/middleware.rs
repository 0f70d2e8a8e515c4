use axum::{
    Form,
    body::Body,
    extract::{FromRequest, FromRequestParts, Request, State},
    http::{HeaderValue, Method, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::session::{AUTH_USER_KEY, CSRF_KEY, Session};
use crate::state::{AppState, blocking};

/// Upper bound on a buffered form body.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// Whether the current request belongs to an existing, signed-in user.
/// Set by [`authenticate`]; defaults to anonymous when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Authenticated(pub bool);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Authenticated>().copied().unwrap_or_default())
    }
}

/// Resolve `authenticatedUserID` against the users table. An id whose user
/// no longer exists is treated as anonymous.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let is_authenticated = match session.get::<i64>(AUTH_USER_KEY).await? {
        Some(id) => {
            let exists = blocking(&state.db, move |db| db.user_exists(id)).await?;
            if !exists {
                debug!(user_id = id, "session refers to a missing user");
            }
            exists
        }
        None => false,
    };

    req.extensions_mut().insert(Authenticated(is_authenticated));
    Ok(next.run(req).await)
}

/// Gate for pages that need a signed-in user. Anonymous requests are sent to
/// the login page; authenticated responses are marked uncacheable.
pub async fn require_authentication(auth: Authenticated, req: Request, next: Next) -> Response {
    if !auth.0 {
        return Redirect::to("/user/login").into_response();
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[derive(Debug, Deserialize)]
struct CsrfField {
    #[serde(default)]
    csrf_token: String,
}

/// Reject state-changing requests whose `csrf_token` form field does not
/// match the token stored in the session.
pub async fn verify_csrf(session: Session, req: Request, next: Next) -> Result<Response, AppError> {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return Ok(next.run(req).await);
    }

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| AppError::Client(StatusCode::BAD_REQUEST))?;

    let probe = axum::http::Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(bytes.clone()))
        .map_err(anyhow::Error::from)?;
    let submitted = match Form::<CsrfField>::from_request(probe, &()).await {
        Ok(Form(field)) => field.csrf_token,
        Err(_) => String::new(),
    };

    let valid = session
        .get::<String>(CSRF_KEY)
        .await?
        .is_some_and(|expected| tokens_match(&expected, &submitted));
    if !valid {
        warn!(path = %parts.uri.path(), "CSRF token missing or invalid");
        return Err(AppError::Client(StatusCode::BAD_REQUEST));
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn tokens_match(expected: &str, submitted: &str) -> bool {
    expected.len() == submitted.len()
        && expected
            .bytes()
            .zip(submitted.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Browser hardening headers on every response.
pub async fn secure_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com",
        ),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("origin-when-cross-origin"),
    );
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("deny"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));

    response
}

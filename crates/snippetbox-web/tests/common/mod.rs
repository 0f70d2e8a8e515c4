#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use tower::ServiceExt;

use snippetbox_db::Database;
use snippetbox_web::{AppStateInner, router};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Drives the full router in-process, carrying the session cookie between
/// requests like a browser would.
pub struct TestClient {
    app: Router,
    pub db: Arc<Database>,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let state = AppStateInner::new(
            db.clone(),
            PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../ui/static")),
            Duration::from_secs(3600),
        );
        Self {
            app: router(state),
            db,
            cookie: None,
        }
    }

    /// Current session token, if the server has issued one.
    pub fn session_token(&self) -> Option<String> {
        self.cookie
            .as_deref()
            .and_then(|c| c.strip_prefix("session="))
            .map(str::to_string)
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).unwrap();

        let mut req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body)).unwrap()).await
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(req).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// Fetch a page to obtain the session's CSRF token.
    pub async fn csrf_token(&mut self) -> String {
        let page = self.get("/user/login").await;
        extract_csrf_token(&page.body)
    }

    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> TestResponse {
        let token = self.csrf_token().await;
        self.post_form(
            "/user/signup",
            &[
                ("csrf_token", &token),
                ("name", name),
                ("email", email),
                ("password", password),
            ],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let token = self.csrf_token().await;
        self.post_form(
            "/user/login",
            &[("csrf_token", &token), ("email", email), ("password", password)],
        )
        .await
    }

    /// Sign up and log in a fresh user.
    pub async fn logged_in() -> Self {
        let mut client = Self::new();
        let signup = client.signup("Alice", "alice@example.com", "pa55word123").await;
        assert_eq!(signup.status, StatusCode::SEE_OTHER);
        let login = client.login("alice@example.com", "pa55word123").await;
        assert_eq!(login.status, StatusCode::SEE_OTHER);
        client
    }
}

pub fn extract_csrf_token(body: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = body.find(marker).expect("page has no csrf field") + marker.len();
    let end = body[start..].find('"').unwrap();
    body[start..start + end].to_string()
}

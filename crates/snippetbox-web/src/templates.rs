//! Page template cache and the data envelope every page receives.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Datelike, Utc};
use maud::Markup;
use tracing::debug;

use snippetbox_db::Snippet;

use crate::error::AppError;
use crate::forms::{SnippetCreateForm, UserLoginForm, UserSignupForm};
use crate::middleware::Authenticated;
use crate::pages;
use crate::session::{FLASH_KEY, Session, csrf_token};

pub type PageFn = fn(&TemplateData) -> Markup;

/// The form, if any, a page is rendered with.
#[derive(Debug, Clone, Default)]
pub enum PageForm {
    #[default]
    None,
    SnippetCreate(SnippetCreateForm),
    Signup(UserSignupForm),
    Login(UserLoginForm),
}

#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub form: PageForm,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

impl TemplateData {
    /// Request-level defaults. Consumes the pending flash message.
    pub async fn new(session: &Session, auth: Authenticated) -> Result<Self, AppError> {
        Ok(Self {
            current_year: Utc::now().year(),
            flash: session.remove::<String>(FLASH_KEY).await?,
            is_authenticated: auth.0,
            csrf_token: csrf_token(session).await?,
            ..Default::default()
        })
    }

    pub fn with_form(mut self, form: PageForm) -> Self {
        self.form = form;
        self
    }
}

/// Page name to page function, assembled once at startup.
pub struct TemplateCache {
    pages: HashMap<&'static str, PageFn>,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCache {
    pub fn new() -> Self {
        let pages: HashMap<&'static str, PageFn> = HashMap::from([
            ("home.html", pages::home as PageFn),
            ("view.html", pages::view as PageFn),
            ("create.html", pages::create as PageFn),
            ("signup.html", pages::signup as PageFn),
            ("login.html", pages::login as PageFn),
        ]);
        debug!(pages = pages.len(), "template cache built");
        Self { pages }
    }

    /// Render `page` in full, then respond with `status`. An unknown page
    /// name is a server error.
    pub fn render(
        &self,
        status: StatusCode,
        page: &str,
        data: &TemplateData,
    ) -> Result<Response, AppError> {
        let page_fn = self
            .pages
            .get(page)
            .ok_or_else(|| anyhow::anyhow!("the template {} does not exist", page))?;

        let body = page_fn(data).into_string();
        Ok((status, Html(body)).into_response())
    }
}

/// `02 Jan 2006 at 15:04`, always UTC.
pub fn human_date(t: DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_session;
    use chrono::TimeZone;

    #[test]
    fn human_date_format() {
        let t = Utc.with_ymd_and_hms(2023, 12, 17, 10, 15, 0).unwrap();
        assert_eq!(human_date(t), "17 Dec 2023 at 10:15");
    }

    #[test]
    fn every_page_is_registered() {
        let cache = TemplateCache::new();
        for page in ["home.html", "view.html", "create.html", "signup.html", "login.html"] {
            assert!(cache.pages.contains_key(page), "{page} missing");
        }
    }

    #[test]
    fn unknown_page_is_an_error() {
        let cache = TemplateCache::new();
        let result = cache.render(StatusCode::OK, "missing.html", &TemplateData::default());
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn render_uses_requested_status() {
        let cache = TemplateCache::new();
        let data = TemplateData::default().with_form(PageForm::Login(UserLoginForm::default()));
        let response = cache
            .render(StatusCode::UNPROCESSABLE_ENTITY, "login.html", &data)
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn new_consumes_flash() {
        let session = test_session();
        session.insert(FLASH_KEY, "hello").await.unwrap();

        let data = TemplateData::new(&session, Authenticated(true)).await.unwrap();
        assert_eq!(data.flash.as_deref(), Some("hello"));
        assert!(data.is_authenticated);
        assert!(!data.csrf_token.is_empty());

        let again = TemplateData::new(&session, Authenticated(false)).await.unwrap();
        assert_eq!(again.flash, None);
        assert_eq!(again.csrf_token, data.csrf_token);
    }
}

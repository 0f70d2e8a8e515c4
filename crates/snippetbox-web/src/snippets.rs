use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use snippetbox_db::DbError;

use crate::error::AppError;
use crate::forms::SnippetCreateForm;
use crate::middleware::Authenticated;
use crate::session::{FLASH_KEY, Session};
use crate::state::{AppState, blocking};
use crate::templates::{PageForm, TemplateData};

/// GET /: the latest live snippets.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
) -> Result<Response, AppError> {
    let snippets = blocking(&state.db, |db| db.latest_snippets()).await?;

    let mut data = TemplateData::new(&session, auth).await?;
    data.snippets = snippets;
    state.templates.render(StatusCode::OK, "home.html", &data)
}

/// GET /snippet/view/{id}: ids that are not positive integers, and snippets
/// that are missing or expired, are all 404.
pub async fn snippet_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    session: Session,
    auth: Authenticated,
) -> Result<Response, AppError> {
    let id = match id.parse::<i64>() {
        Ok(id) if id >= 1 => id,
        _ => return Err(AppError::NotFound),
    };

    let snippet = match blocking(&state.db, move |db| db.get_snippet(id)).await {
        Ok(snippet) => snippet,
        Err(DbError::NoRecord) => return Err(AppError::NotFound),
        Err(e) => return Err(e.into()),
    };

    let mut data = TemplateData::new(&session, auth).await?;
    data.snippet = Some(snippet);
    state.templates.render(StatusCode::OK, "view.html", &data)
}

/// GET /snippet/create
pub async fn snippet_create(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
) -> Result<Response, AppError> {
    let data = TemplateData::new(&session, auth)
        .await?
        .with_form(PageForm::SnippetCreate(SnippetCreateForm::default()));
    state.templates.render(StatusCode::OK, "create.html", &data)
}

/// POST /snippet/create
pub async fn snippet_create_post(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
    form: Result<Form<SnippetCreateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Ok(Form(mut form)) = form else {
        return Err(AppError::Client(StatusCode::BAD_REQUEST));
    };

    form.validate();
    if !form.validator.valid() {
        let data = TemplateData::new(&session, auth)
            .await?
            .with_form(PageForm::SnippetCreate(form));
        return state
            .templates
            .render(StatusCode::UNPROCESSABLE_ENTITY, "create.html", &data);
    }

    let SnippetCreateForm {
        title,
        content,
        expires,
        ..
    } = form;
    let id = blocking(&state.db, move |db| db.insert_snippet(&title, &content, expires)).await?;
    info!(snippet_id = id, "snippet created");

    session.insert(FLASH_KEY, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}

use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::info;

use snippetbox_db::DbError;

use crate::error::AppError;
use crate::forms::{UserLoginForm, UserSignupForm};
use crate::middleware::Authenticated;
use crate::session::{AUTH_USER_KEY, FLASH_KEY, Session};
use crate::state::{AppState, blocking};
use crate::templates::{PageForm, TemplateData};

pub async fn user_signup(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
) -> Result<Response, AppError> {
    let data = TemplateData::new(&session, auth)
        .await?
        .with_form(PageForm::Signup(UserSignupForm::default()));
    state.templates.render(StatusCode::OK, "signup.html", &data)
}

pub async fn user_signup_post(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
    form: Result<Form<UserSignupForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Ok(Form(mut form)) = form else {
        return Err(AppError::Client(StatusCode::BAD_REQUEST));
    };

    form.validate();
    if !form.validator.valid() {
        let data = TemplateData::new(&session, auth)
            .await?
            .with_form(PageForm::Signup(form));
        return state
            .templates
            .render(StatusCode::UNPROCESSABLE_ENTITY, "signup.html", &data);
    }

    let (name, email, password) = (form.name.clone(), form.email.clone(), form.password.clone());
    match blocking(&state.db, move |db| db.insert_user(&name, &email, &password)).await {
        Ok(id) => info!(user_id = id, "user signed up"),
        Err(DbError::DuplicateEmail) => {
            form.validator
                .add_field_error("email", "Email address is already in use");
            let data = TemplateData::new(&session, auth)
                .await?
                .with_form(PageForm::Signup(form));
            return state
                .templates
                .render(StatusCode::UNPROCESSABLE_ENTITY, "signup.html", &data);
        }
        Err(e) => return Err(e.into()),
    }

    session
        .insert(FLASH_KEY, "Your signup was successful. Please log in.")
        .await?;
    Ok(Redirect::to("/user/login").into_response())
}

pub async fn user_login(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
) -> Result<Response, AppError> {
    let data = TemplateData::new(&session, auth)
        .await?
        .with_form(PageForm::Login(UserLoginForm::default()));
    state.templates.render(StatusCode::OK, "login.html", &data)
}

/// POST /user/login: an invalid form stops here with 422; credentials are
/// only checked for a well-formed submission.
pub async fn user_login_post(
    State(state): State<AppState>,
    session: Session,
    auth: Authenticated,
    form: Result<Form<UserLoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Ok(Form(mut form)) = form else {
        return Err(AppError::Client(StatusCode::BAD_REQUEST));
    };

    form.validate();
    if !form.validator.valid() {
        let data = TemplateData::new(&session, auth)
            .await?
            .with_form(PageForm::Login(form));
        return state
            .templates
            .render(StatusCode::UNPROCESSABLE_ENTITY, "login.html", &data);
    }

    let (email, password) = (form.email.clone(), form.password.clone());
    let id = match blocking(&state.db, move |db| db.authenticate(&email, &password)).await {
        Ok(id) => id,
        Err(DbError::InvalidCredentials) => {
            form.validator
                .add_non_field_error("Email or password is incorrect");
            let data = TemplateData::new(&session, auth)
                .await?
                .with_form(PageForm::Login(form));
            return state
                .templates
                .render(StatusCode::UNPROCESSABLE_ENTITY, "login.html", &data);
        }
        Err(e) => return Err(e.into()),
    };

    session.cycle_id().await?;
    session.insert(AUTH_USER_KEY, id).await?;
    info!(user_id = id, "user logged in");

    Ok(Redirect::to("/snippet/create").into_response())
}

pub async fn user_logout_post(session: Session) -> Result<Response, AppError> {
    session.cycle_id().await?;
    session.remove::<i64>(AUTH_USER_KEY).await?;
    session
        .insert(FLASH_KEY, "You've been logged out successfully!")
        .await?;

    Ok(Redirect::to("/").into_response())
}

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use super::found;
use crate::auth::middleware::{expired_session_cookie, session_cookie};
use crate::auth::MaybeUser;
use crate::forms::{safe_next, FormErrors, LoginForm, SignupForm};
use crate::models::user::CreateUserRequest;
use crate::views::{self, Layout, LoggedOutTemplate, LoginTemplate, SignupTemplate};
use crate::{urls, AppError, AppState, Result};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(signup_form).post(signup))
        .route("/login/", get(login_form).post(login))
        .route("/logout/", get(logout).post(logout))
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn signup_page(viewer: Option<String>, form: &SignupForm, errors: FormErrors) -> Result<Html<String>> {
    Ok(views::render(SignupTemplate {
        layout: Layout::new("Sign up", viewer),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        username: form.username.clone(),
        email: form.email.clone(),
        errors,
    })?)
}

fn login_page(viewer: Option<String>, username: &str, next: Option<String>, errors: FormErrors) -> Result<Html<String>> {
    Ok(views::render(LoginTemplate {
        layout: Layout::new("Log in", viewer),
        username: username.to_string(),
        next,
        errors,
    })?)
}

async fn signup_form(viewer: MaybeUser) -> Result<Html<String>> {
    signup_page(viewer.username(), &SignupForm::default(), FormErrors::default())
}

/// Creates the account and signs the new user in.
async fn signup(
    State(state): State<AppState>,
    viewer: MaybeUser,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    let mut errors = match form.clean() {
        Ok(()) => FormErrors::default(),
        Err(errors) => errors,
    };
    if !errors.has("username") && state.user_service.username_taken(&form.username).await? {
        errors.add("username", "A user with that username already exists.");
    }
    if !errors.is_empty() {
        return Ok(signup_page(viewer.username(), &form, errors)?.into_response());
    }

    let request = CreateUserRequest {
        username: form.username.clone(),
        email: form.email.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        password: form.password1.clone(),
    };
    let user = state.user_service.create_user(request, &state.auth_service).await?;
    let token = state.auth_service.generate_token(user.id, &user.username)?;

    Ok((jar.add(session_cookie(token, state.config.session_ttl_hours)), found(&urls::index())).into_response())
}

async fn login_form(viewer: MaybeUser, Query(query): Query<NextQuery>) -> Result<Html<String>> {
    login_page(viewer.username(), "", safe_next(query.next.as_deref()), FormErrors::default())
}

async fn login(
    State(state): State<AppState>,
    viewer: MaybeUser,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref());

    if let Err(invalid) = form.validate() {
        return Ok(login_page(viewer.username(), &form.username, next, invalid.into())?.into_response());
    }

    match state
        .user_service
        .authenticate_user(&form.username, &form.password, &state.auth_service)
        .await
    {
        Ok((user, token)) => {
            tracing::info!(username = %user.username, "user logged in");
            let target = next.unwrap_or_else(urls::index);
            Ok((jar.add(session_cookie(token, state.config.session_ttl_hours)), found(&target)).into_response())
        }
        Err(AppError::AuthError(message)) => {
            let mut errors = FormErrors::default();
            errors.add_non_field(message);
            Ok(login_page(viewer.username(), &form.username, next, errors)?.into_response())
        }
        Err(e) => Err(e),
    }
}

async fn logout(jar: CookieJar) -> Result<Response> {
    let page = views::render(LoggedOutTemplate {
        layout: Layout::new("Logged out", None),
    })?;
    Ok((jar.remove(expired_session_cookie()), page).into_response())
}

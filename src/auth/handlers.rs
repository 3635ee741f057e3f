use axum::{
    extract::{FromRef, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        password::{hash_password_async, verify_password_async},
        repo_types::{CreateUserError, User},
        services::{is_valid_email, normalize_email},
        session::SessionKeys,
    },
    error::AppResult,
    state::AppState,
    views::{self, AuthKind, AuthView},
};

pub const EMAIL_EXISTS: &str = "Email already exists";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const USER_NOT_FOUND: &str = "User not found";
pub const WRONG_PASSWORD: &str = "Wrong password";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/register", get(register_form).post(register))
        .route("/logout", post(logout))
}

/// Same form again with an inline message; deliberately a 200, not an error status.
fn auth_page(kind: AuthKind, error: Option<&'static str>) -> Html<String> {
    views::auth(&AuthView { kind, error })
}

pub async fn login_form() -> Html<String> {
    auth_page(AuthKind::Login, None)
}

pub async fn register_form() -> Html<String> {
    auth_page(AuthKind::Register, None)
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(mut form): Form<RegisterForm>,
) -> AppResult<Response> {
    form.email = normalize_email(&form.email);

    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email");
        return Ok(auth_page(AuthKind::Register, Some(INVALID_EMAIL)).into_response());
    }

    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Ok(auth_page(AuthKind::Register, Some(EMAIL_EXISTS)).into_response());
    }

    let hash = hash_password_async(form.password.clone()).await?;

    let user = match User::create(&state.db, form.name.trim(), &form.email, &hash).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %form.email, "email registered concurrently");
            return Ok(auth_page(AuthKind::Register, Some(EMAIL_EXISTS)).into_response());
        }
        Err(CreateUserError::Database(e)) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Redirect::to("/login").into_response())
}

#[instrument(skip(state, jar, form))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> AppResult<Response> {
    form.email = normalize_email(&form.email);

    let Some(user) = User::find_by_email(&state.db, &form.email).await? else {
        warn!(email = %form.email, "login unknown email");
        return Ok(auth_page(AuthKind::Login, Some(USER_NOT_FOUND)).into_response());
    };

    if !verify_password_async(form.password.clone(), user.password_hash.clone()).await? {
        warn!(email = %form.email, user_id = %user.id, "login invalid password");
        return Ok(auth_page(AuthKind::Login, Some(WRONG_PASSWORD)).into_response());
    }

    let jar = SessionKeys::from_ref(&state).establish(jar, user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok((jar, Redirect::to("/")).into_response())
}

#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = SessionKeys::from_ref(&state).clear(jar);
    info!("session cleared");
    (jar, Redirect::to("/login"))
}

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error, warn};

use super::repo_types::User;
use super::session::SessionKeys;
use crate::error::AppError;
use crate::state::AppState;

/// Authorization gate: the acting user of a route that requires identity.
///
/// Extraction runs before the handler body, so a handler taking
/// `CurrentUser` only ever executes with a resolved, existing user. Anything
/// else is answered with a redirect to `/login`.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(user_id) = SessionKeys::from_ref(state).resolve(&jar) else {
            debug!(uri = %parts.uri, "no session, redirecting to login");
            return Err(Redirect::to("/login").into_response());
        };

        match User::find_by_id(&state.db, user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                warn!(%user_id, "session refers to unknown user");
                Err(Redirect::to("/login").into_response())
            }
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}

/// Optional identity for public pages. Never rejects; a missing or stale
/// session simply yields `None`.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(user_id) = SessionKeys::from_ref(state).resolve(&jar) else {
            return Ok(MaybeUser(None));
        };
        match User::find_by_id(&state.db, user_id).await {
            Ok(user) => Ok(MaybeUser(user)),
            Err(e) => {
                error!(error = %e, %user_id, "load session user failed; treating as guest");
                Ok(MaybeUser(None))
            }
        }
    }
}

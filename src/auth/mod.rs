use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub(crate) mod services;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod otp;
pub mod password;
pub mod repo;
pub(crate) mod repo_types;
pub mod session;
pub mod validation;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

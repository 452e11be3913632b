use crate::state::AppState;
use axum::Router;

pub mod authz;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::router()
}

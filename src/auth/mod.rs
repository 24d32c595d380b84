use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod password;
pub mod services;
pub(crate) mod extractors;
mod validation;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes(max_upload_bytes))
        .merge(handlers::me_routes())
}

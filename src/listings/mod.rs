pub mod dto;
pub mod feed;
pub mod filter;
pub mod handlers;
pub mod repo;
pub mod specs;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}

use axum::Router;

pub mod items;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new().merge(items::router())
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared `ItemService`
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and query strings
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use stockroom_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    router_with_services(Arc::new(services), &config.cors_origin)
}

/// Build the router around already-wired services.
pub fn router_with_services(
    services: Arc<services::AppServices>,
    cors_origin: &str,
) -> anyhow::Result<Router> {
    let cors = cors_layer(cors_origin)?;

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
}

fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin.trim() == "*" {
        return Ok(layer.allow_origin(Any));
    }

    let origin = HeaderValue::from_str(origin.trim())
        .with_context(|| format!("invalid CORS origin: {origin}"))?;
    Ok(layer.allow_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origin_must_be_a_valid_header_value() {
        assert!(cors_layer("http://localhost:5173").is_ok());
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}

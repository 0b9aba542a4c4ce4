//! HTTP application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: long-lived services (store handle, views)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: form/query schemas and view models
//! - `views.rs`: template rendering
//! - `errors.rs`: the error normalizer

use std::sync::Arc;

use axum::{extract::Request, Extension, Router};
use tower::util::{MapRequest, MapRequestLayer};
use tower::Layer;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod views;

pub use services::AppServices;

/// The complete service: method override in front of the router.
pub type App = MapRequest<Router, fn(Request) -> Request>;

/// Build the full HTTP application (public entrypoint used by `main.rs` and tests).
///
/// Serve with `axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(app))`.
pub fn build_app(services: Arc<AppServices>) -> App {
    let router = routes::router()
        .layer(Extension(services))
        .layer(TraceLayer::new_for_http());

    // `Router::layer` middleware runs after route matching; the override has to wrap the router.
    let method_override: fn(Request) -> Request = middleware::method_override;
    MapRequestLayer::new(method_override).layer(router)
}


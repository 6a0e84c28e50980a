//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Request extractors
//! - Response types

pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use parley_core::upload::{ImageUploadService, IntakePolicy};
use parley_shared::JwtService;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Upload pipeline.
    pub uploads: Arc<ImageUploadService>,
    /// Limits applied while reading multipart bodies.
    pub intake: IntakePolicy,
}

/// Creates the main application router.
///
/// `client_url` is the only origin allowed by CORS; requests from it may
/// carry credentials.
pub fn create_router(state: AppState, client_url: &str) -> Router {
    let router = Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([header::AUTHORIZATION]))
        .layer(cors_layer(client_url))
        .with_state(state);

    with_security_headers(router)
}

/// Content security policy for a JSON-only API.
const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; frame-ancestors 'self'";

/// Standard hardening headers, kept when a handler already set them.
fn with_security_headers(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let origin = HeaderValue::from_str(client_url).map_or_else(
        |_| {
            tracing::warn!(client_url, "Invalid client URL, CORS disabled");
            AllowOrigin::list([])
        },
        AllowOrigin::exact,
    );

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

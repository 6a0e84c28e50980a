//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod health;
pub mod upload;

/// Creates the `/api` router; every route in it requires authentication.
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/upload", upload::routes(&state.intake))
        .layer(middleware::from_fn_with_state(state, auth_middleware))
}

//! HTTP surface: the versioned API router and the server loop.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::ApiState;

use std::net::SocketAddr;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::application::error::AppError;
use crate::infra::error::InfraError;

pub fn build_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    let authed = Router::new()
        .route(
            "/api/v1/templates",
            get(handlers::list_templates).post(handlers::save_template),
        )
        .route(
            "/api/v1/templates/selection",
            get(handlers::get_selection).put(handlers::put_selection),
        )
        .route("/api/v1/templates/cache", delete(handlers::clear_cache))
        .route("/api/v1/templates/{slug}", get(handlers::resolve_template))
        .route(
            "/api/v1/templates/{slug}/refresh",
            post(handlers::refresh_template),
        )
        .route("/api/v1/customizer/enter", post(handlers::enter_customizer))
        .route("/api/v1/customizer/exit", post(handlers::exit_customizer))
        .route("/api/v1/profile-links", post(handlers::create_profile_link))
        .route(
            "/api/v1/profile-links/{token}/active",
            post(handlers::set_profile_link_active),
        )
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            middleware::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/public/profiles/{token}",
            get(handlers::resolve_public_profile),
        )
        .merge(authed)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: ApiState) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(InfraError::from)
        .map_err(AppError::from)?;
    info!(%addr, "listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(err.to_string()))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

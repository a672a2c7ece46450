use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post};
use terreno_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    let session_routes = Router::new()
        .route(
            "/api/dashboard/sections",
            get(handlers::dashboard::list_sections_handler),
        )
        .route(
            "/api/dashboard/sections/{section}",
            get(handlers::dashboard::section_handler),
        )
        .route(
            "/api/dashboard/refresh",
            post(handlers::dashboard::refresh_permissions_handler),
        )
        .route(
            "/api/dashboard/permissions",
            delete(handlers::dashboard::reset_permissions_handler),
        )
        .route(
            "/api/network/hierarchy",
            get(handlers::network::hierarchy_handler),
        )
        .route_layer(from_fn(middleware::resolve_session_identity));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

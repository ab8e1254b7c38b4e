//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::routes::{alerts, import, replacements, rotation, schedules};

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static segments win over `{id}` in axum's matcher, so the order here is cosmetic.
    let api_v1 = Router::new()
        // Schedule CRUD
        .route(
            schedules::SCHEDULES,
            get(handlers::list_schedules).post(handlers::create_schedule),
        )
        .route(
            schedules::SCHEDULES_BULK,
            post(handlers::create_schedules_bulk).delete(handlers::delete_schedules_bulk),
        )
        .route(
            schedules::SCHEDULE_BY_ID,
            get(handlers::get_schedule)
                .patch(handlers::update_schedule)
                .delete(handlers::delete_schedule),
        )
        // Planning views
        .route(schedules::WEEK_VIEW, get(handlers::week_view))
        .route(schedules::MONTH_VIEW, get(handlers::month_view))
        // Legal alerts
        .route(alerts::ALERTS, get(handlers::get_alerts))
        // Rotation
        .route(rotation::ROTATION_PREVIEW, post(handlers::preview_rotation))
        .route(rotation::ROTATION_GENERATE, post(handlers::generate_rotation))
        // Replacements
        .route(
            replacements::REPLACEMENTS,
            get(handlers::list_replacements).post(handlers::create_replacement),
        )
        .route(
            replacements::REPLACEMENT_SUGGESTIONS,
            get(handlers::replacement_suggestions),
        )
        .route(
            replacements::REPLACEMENT_APPROVE,
            patch(handlers::approve_replacement),
        )
        .route(
            replacements::REPLACEMENT_REJECT,
            patch(handlers::reject_replacement),
        )
        // CSV import
        .route(import::IMPORT_CSV, post(handlers::import_csv))
        .route(import::IMPORT_TEMPLATE, get(handlers::import_template));

    let body_limit = state.config.server.body_limit_bytes;

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

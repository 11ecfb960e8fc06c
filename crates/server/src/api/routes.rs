use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

use super::{config, handlers, history, reserve, schedule, ws};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Dashboard static files path (configurable via env)
    let dashboard_dir =
        std::env::var("DASHBOARD_DIR").unwrap_or_else(|_| "dashboard".to_string());

    // API routes
    let api_routes = Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Booking settings
        .route("/config", get(config::get_config))
        .route("/config/selection", put(config::update_selection))
        .route("/config/credentials", put(config::update_credentials))
        // Schedules
        .route("/schedule/days/{date}", put(schedule::set_day))
        .route("/schedule/custom", post(schedule::create_custom))
        .route("/schedule/custom/{id}", delete(schedule::delete_custom))
        // Reservation runs
        .route("/reserve", post(reserve::reserve_now))
        .route("/reserve/date", post(reserve::reserve_for_date))
        // Audit history
        .route("/history", get(history::recent))
        .route("/history/{date}", get(history::for_date))
        // Live progress stream
        .route("/ws", get(ws::ws_handler));

    // Serve dashboard with SPA fallback
    let index_path = format!("{}/index.html", dashboard_dir);
    let serve_dir = ServeDir::new(&dashboard_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(super::middleware::metrics_middleware))
        .with_state(state)
}

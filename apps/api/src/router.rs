use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::auth_routes;
use booking_queue_cell::{booking_routes, dashboard_routes};
use clinic_cell::clinic_routes;
use shared_utils::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "OPD queue API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/clinic", clinic_routes(state.clone()))
        .nest("/appointments", booking_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state))
}

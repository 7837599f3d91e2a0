use std::sync::Arc;
use axum::{
    Router,
    routing::{get, post},
    middleware,
};

use shared_utils::extractor::require_session;
use shared_utils::AppState;
use crate::handlers::{
    book_appointment,
    get_appointment,
    track_appointment,
    appointment_events,
    list_appointments,
    advance_appointment,
    skip_appointment,
};

/// Patient-facing routes: booking, polling and lookup. No session needed.
pub fn booking_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(book_appointment))
        .route("/{appointment_id}", get(get_appointment))
        .route("/{appointment_id}/track", get(track_appointment))
        .route("/{appointment_id}/events", get(appointment_events))
        .with_state(state)
}

/// Doctor dashboard routes, behind the operator session gate.
pub fn dashboard_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/appointments", get(list_appointments))
        .route("/appointments/{appointment_id}/advance", post(advance_appointment))
        .route("/appointments/{appointment_id}/skip", post(skip_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_utils::extractor::require_session;
use shared_utils::AppState;

use crate::handlers;

pub fn clinic_routes(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::get_clinic));

    let protected_routes = Router::new()
        .route("/status", put(handlers::update_clinic_status))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};
use tracing::debug;

use shared_models::error::AppError;
use shared_models::Session;

use crate::state::AppState;

// Dashboard gate. Only checks that an operator session marker exists;
// there are no credentials behind it.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = state
        .store
        .get_session()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .filter(Session::is_admin)
        .ok_or_else(|| AppError::Auth("Operator login required".to_string()))?;

    debug!("Session gate passed for role {:?}", session.role);

    // Add session to request extensions
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}


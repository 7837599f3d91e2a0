use std::sync::Arc;

use axum::{
    extract::{State, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use shared_models::error::AppError;
use shared_models::{Session, SessionRole};
use shared_utils::AppState;

/// Login form. Credentials are accepted as-is; there is no account store.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub active: bool,
    pub role: Option<SessionRole>,
}

impl From<Option<Session>> for SessionResponse {
    fn from(session: Option<Session>) -> Self {
        Self {
            active: session.is_some(),
            role: session.map(|s| s.role),
        }
    }
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    // Placeholder: any credentials open an operator session.
    let session = Session::admin();

    state
        .store
        .set_session(&session)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    info!("Operator session started for '{}'", request.username);
    Ok(Json(SessionResponse::from(Some(session))))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    state
        .store
        .clear_session()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    info!("Operator session cleared");
    Ok(Json(SessionResponse::from(None)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .store
        .get_session()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    debug!("Session check: active={}", session.is_some());
    Ok(Json(SessionResponse::from(session)))
}

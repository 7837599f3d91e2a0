use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    Extension,
};
use tracing::info;

use shared_models::{error::AppError, Clinic, Session};
use shared_utils::AppState;

use crate::models::{ClinicStatusResponse, UpdateClinicStatusRequest};
use crate::services::ClinicService;

/// Public clinic profile, including whether booking is open.
pub async fn get_clinic(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Clinic>, AppError> {
    let clinic_service = ClinicService::new(state.store.clone());
    let clinic = clinic_service.require_active_clinic().await?;

    Ok(Json(clinic))
}

/// Open or close the OPD (dashboard only)
#[axum::debug_handler]
pub async fn update_clinic_status(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(request): Json<UpdateClinicStatusRequest>,
) -> Result<Json<ClinicStatusResponse>, AppError> {
    info!("Clinic status change to {:?} by {:?}", request.status, session.role);

    let clinic_service = ClinicService::new(state.store.clone());

    let clinic_id = match request.clinic_id {
        Some(id) => id,
        None => clinic_service.require_active_clinic().await?.id,
    };

    let clinic = clinic_service
        .set_clinic_status(&clinic_id, request.status)
        .await?;

    Ok(Json(ClinicStatusResponse::new(clinic)))
}

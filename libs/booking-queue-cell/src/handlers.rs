use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    Extension,
};
use futures::stream::{self, Stream};
use tracing::{debug, info};

use clinic_cell::ClinicService;
use shared_models::{error::AppError, Appointment, Session};
use shared_utils::AppState;

use crate::{
    AppointmentUpdate, DashboardView, PatientDetails, QueueEngine, QueueLookup, QueueSummary,
    StatusTracker,
};

fn queue_engine(state: &AppState) -> QueueEngine {
    QueueEngine::new(state.store.clone(), state.config.token_policy)
}

/// Identifiers are opaque; only surrounding whitespace is dropped.
fn parse_appointment_id(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            "Please enter your Appointment ID".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Book an appointment at the active clinic
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Json(details): Json<PatientDetails>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let clinic = ClinicService::new(state.store.clone())
        .require_active_clinic()
        .await?;

    if !clinic.status.is_open() {
        info!("Booking rejected, clinic {} is closed", clinic.id);
        return Err(AppError::Conflict(
            "OPD is closed. Appointment booking is stopped.".to_string(),
        ));
    }

    let appointment = queue_engine(&state)
        .book_appointment(&clinic.id, details)
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Current record for one appointment; polled by the booking success view
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;

    queue_engine(&state)
        .get_appointment(&appointment_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Appointment not found".to_string()))
}

/// Track queue position by appointment ID
pub async fn track_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<QueueLookup>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    debug!("Tracking appointment {}", appointment_id);

    let lookup = queue_engine(&state).lookup(&appointment_id).await?;

    Ok(Json(lookup))
}

/// Server-sent status updates for one appointment
pub async fn appointment_events(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    let engine = queue_engine(&state);

    // Fail fast instead of streaming nothing for an unknown ID.
    if engine.get_appointment(&appointment_id).await?.is_none() {
        return Err(AppError::NotFound("Appointment not found".to_string()));
    }

    info!("Live status stream opened for {}", appointment_id);
    let tracker = StatusTracker::spawn(engine, appointment_id, state.status_poll_interval());

    let updates = stream::unfold(tracker, |mut tracker| async move {
        let appointment = tracker.changed().await?;
        let update = AppointmentUpdate::new(appointment);
        let event = Event::default()
            .event("status")
            .json_data(&update)
            .unwrap_or_else(|_| Event::default().event("status").data(update.message.clone()));
        Some((Ok::<_, Infallible>(event), tracker))
    });

    Ok(Sse::new(updates).keep_alive(KeepAlive::default()))
}

/// Dashboard listing: every appointment for the active clinic, oldest first
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Extension(_session): Extension<Session>,
) -> Result<Json<DashboardView>, AppError> {
    let clinic = ClinicService::new(state.store.clone())
        .require_active_clinic()
        .await?;

    let engine = queue_engine(&state);
    let appointments = engine.appointments_for_clinic(&clinic.id).await?;
    let summary = QueueSummary::from_appointments(&appointments);

    Ok(Json(DashboardView {
        clinic,
        appointments,
        summary,
    }))
}

/// Next patient: waiting -> in consultation -> completed
pub async fn advance_appointment(
    State(state): State<Arc<AppState>>,
    Extension(_session): Extension<Session>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;

    let appointment = queue_engine(&state).advance(&appointment_id).await?;

    Ok(Json(appointment))
}

/// Mark a waiting patient as a no-show
pub async fn skip_appointment(
    State(state): State<Arc<AppState>>,
    Extension(_session): Extension<Session>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;

    let appointment = queue_engine(&state).skip(&appointment_id).await?;

    Ok(Json(appointment))
}

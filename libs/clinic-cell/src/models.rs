use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::StoreError;
use shared_models::{error::AppError, Clinic, ClinicStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateClinicStatusRequest {
    pub status: ClinicStatus,
    /// Defaults to the active (first) clinic. Any other id is rejected.
    #[serde(default)]
    pub clinic_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicStatusResponse {
    pub clinic: Clinic,
    pub message: String,
}

impl ClinicStatusResponse {
    pub fn new(clinic: Clinic) -> Self {
        let message = status_message(clinic.status).to_string();
        Self { clinic, message }
    }
}

/// Operator-facing text shown after toggling the OPD.
pub fn status_message(status: ClinicStatus) -> &'static str {
    match status {
        ClinicStatus::Open => "OPD is open. Patients can book appointments.",
        ClinicStatus::Closed => "OPD is closed. Appointment booking is stopped.",
    }
}

#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("No clinic is configured")]
    NoClinicConfigured,

    #[error("Clinic not found: {0}")]
    NotFound(String),

    #[error("Clinic {0} is not the active clinic")]
    NotActiveClinic(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ClinicError> for AppError {
    fn from(e: ClinicError) -> Self {
        match e {
            ClinicError::NoClinicConfigured | ClinicError::NotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            ClinicError::NotActiveClinic(_) => AppError::ValidationError(e.to_string()),
            ClinicError::Store(inner) => AppError::Database(inner.to_string()),
        }
    }
}

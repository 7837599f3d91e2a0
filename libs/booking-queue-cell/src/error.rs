use thiserror::Error;

use shared_database::StoreError;
use shared_models::{error::AppError, AppointmentStatus};

#[derive(Error, Debug)]
pub enum BookingQueueError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("Invalid appointment status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}

impl From<BookingQueueError> for AppError {
    fn from(e: BookingQueueError) -> Self {
        match e {
            BookingQueueError::ValidationError(msg) => AppError::ValidationError(msg),
            BookingQueueError::AppointmentNotFound(_) => AppError::NotFound(
                "Appointment not found. Please check your Appointment ID.".to_string(),
            ),
            BookingQueueError::InvalidStatusTransition { .. } => AppError::Conflict(e.to_string()),
            BookingQueueError::Store(inner) => AppError::Database(inner.to_string()),
        }
    }
}

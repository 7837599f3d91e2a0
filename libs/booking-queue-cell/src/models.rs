use serde::{Deserialize, Serialize};

use shared_models::{Appointment, AppointmentStatus, Clinic};

use crate::BookingQueueError;

/// Booking form input. Date and time are free text and are not checked
/// against clinic hours.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientDetails {
    pub name: String,
    pub mobile: String,
    #[serde(default)]
    pub address: String,
    pub date: String,
    pub time: String,
}

impl PatientDetails {
    /// Trims every field and rejects blank required ones.
    pub fn validated(self) -> Result<Self, BookingQueueError> {
        let details = Self {
            name: self.name.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            address: self.address.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
        };

        let missing: Vec<&str> = [
            ("name", &details.name),
            ("mobile", &details.mobile),
            ("date", &details.date),
            ("time", &details.time),
        ]
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| *field)
        .collect();

        if !missing.is_empty() {
            return Err(BookingQueueError::ValidationError(format!(
                "Missing required patient details: {}",
                missing.join(", ")
            )));
        }

        Ok(details)
    }
}

/// Live queue position for one appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueLookup {
    pub appointment: Appointment,
    pub currently_serving_token: u32,
    pub currently_serving_name: String,
    pub patients_ahead: usize,
}

/// Per-status counts for the dashboard cards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueSummary {
    pub waiting: usize,
    pub in_consultation: usize,
    pub completed: usize,
    pub skipped: usize,
    pub total: usize,
}

impl QueueSummary {
    pub fn from_appointments<'a>(appointments: impl IntoIterator<Item = &'a Appointment>) -> Self {
        appointments
            .into_iter()
            .fold(Self::default(), |mut summary, appointment| {
                match appointment.status {
                    AppointmentStatus::Waiting => summary.waiting += 1,
                    AppointmentStatus::Processing => summary.in_consultation += 1,
                    AppointmentStatus::Completed => summary.completed += 1,
                    AppointmentStatus::Skipped => summary.skipped += 1,
                }
                summary.total += 1;
                summary
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub clinic: Clinic,
    pub appointments: Vec<Appointment>,
    pub summary: QueueSummary,
}

/// Sent on each live-status update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentUpdate {
    pub appointment: Appointment,
    pub message: String,
}

impl AppointmentUpdate {
    pub fn new(appointment: Appointment) -> Self {
        let message = match appointment.status {
            AppointmentStatus::Waiting => "Waiting",
            AppointmentStatus::Processing => "In Consultation",
            AppointmentStatus::Completed => "Consultation completed",
            AppointmentStatus::Skipped => "Marked as no-show",
        }
        .to_string();

        Self { appointment, message }
    }
}

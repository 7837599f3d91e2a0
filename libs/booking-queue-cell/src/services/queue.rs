use chrono::{SubsecRound, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::TokenPolicy;
use shared_database::RecordStore;
use shared_models::{Appointment, AppointmentStatus};

use crate::{BookingQueueError, PatientDetails, QueueLookup, QueueSummary};

/// Token numbering, status transitions and queue-position lookups over the
/// persisted appointment collection.
///
/// Every mutation is a whole-collection read-modify-write through
/// [`RecordStore::modify_appointments`], which serialises writers within the
/// process.
#[derive(Clone)]
pub struct QueueEngine {
    store: RecordStore,
    policy: TokenPolicy,
}

impl QueueEngine {
    pub fn new(store: RecordStore, policy: TokenPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TokenPolicy {
        self.policy
    }

    /// Books a new appointment and assigns its queue token.
    ///
    /// Does not look at clinic open/closed status; callers gate that.
    pub async fn book_appointment(
        &self,
        clinic_id: &str,
        details: PatientDetails,
    ) -> Result<Appointment, BookingQueueError> {
        let details = details.validated()?;
        let policy = self.policy;

        let appointment = self
            .store
            .modify_appointments(|appointments| {
                let appointment = Appointment {
                    id: Uuid::new_v4().to_string(),
                    clinic_id: clinic_id.to_string(),
                    patient_name: details.name,
                    mobile: details.mobile,
                    address: details.address,
                    date: details.date,
                    time: details.time,
                    token: next_token(appointments, clinic_id, policy),
                    status: AppointmentStatus::Waiting,
                    // Stored at millisecond precision.
                    created_at: Utc::now().trunc_subsecs(3),
                };
                appointments.push(appointment.clone());
                Ok::<_, BookingQueueError>(appointment)
            })
            .await?;

        info!(
            "Booked appointment {} for clinic {} with token #{}",
            appointment.id, clinic_id, appointment.token
        );
        Ok(appointment)
    }

    /// "Next patient": waiting -> processing -> completed.
    /// Completed and skipped records are returned unchanged.
    pub async fn advance(&self, appointment_id: &str) -> Result<Appointment, BookingQueueError> {
        let (before, after) = self
            .transition(appointment_id, |status| Ok(status.advanced()))
            .await?;

        if before == after.status {
            debug!("Appointment {} already {}, advance is a no-op", appointment_id, before);
        } else {
            info!("Appointment {} moved {} -> {}", appointment_id, before, after.status);
        }
        Ok(after)
    }

    /// No-show: waiting -> skipped. Skipping twice is a no-op.
    pub async fn skip(&self, appointment_id: &str) -> Result<Appointment, BookingQueueError> {
        let (before, after) = self
            .transition(appointment_id, |status| match status {
                AppointmentStatus::Waiting | AppointmentStatus::Skipped => {
                    Ok(AppointmentStatus::Skipped)
                }
                other => Err(BookingQueueError::InvalidStatusTransition {
                    from: other,
                    to: AppointmentStatus::Skipped,
                }),
            })
            .await?;

        if before != after.status {
            info!("Appointment {} marked as no-show", appointment_id);
        }
        Ok(after)
    }

    /// Queue position for one appointment. Read-only.
    pub async fn lookup(&self, appointment_id: &str) -> Result<QueueLookup, BookingQueueError> {
        let appointments = self.store.get_appointments().await?;

        let appointment = appointments
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned()
            .ok_or_else(|| BookingQueueError::AppointmentNotFound(appointment_id.to_string()))?;

        let mut clinic_queue: Vec<&Appointment> = appointments
            .iter()
            .filter(|a| a.clinic_id == appointment.clinic_id)
            .collect();
        clinic_queue.sort_by_key(|a| a.token);

        let (serving_token, serving_name) = {
            let serving = clinic_queue
                .iter()
                .find(|a| a.status == AppointmentStatus::Processing)
                .or_else(|| {
                    clinic_queue
                        .iter()
                        .find(|a| a.status == AppointmentStatus::Waiting)
                })
                .copied()
                .unwrap_or(&appointment);
            (serving.token, serving.patient_name.clone())
        };

        let patients_ahead = clinic_queue
            .iter()
            .filter(|a| a.status == AppointmentStatus::Waiting && a.token < appointment.token)
            .count();

        debug!(
            "Lookup {}: token #{}, serving #{}, {} ahead",
            appointment_id, appointment.token, serving_token, patients_ahead
        );

        Ok(QueueLookup {
            appointment,
            currently_serving_token: serving_token,
            currently_serving_name: serving_name,
            patients_ahead,
        })
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, BookingQueueError> {
        let appointments = self.store.get_appointments().await?;
        Ok(appointments.into_iter().find(|a| a.id == appointment_id))
    }

    /// All appointments for the clinic, oldest booking first.
    pub async fn appointments_for_clinic(
        &self,
        clinic_id: &str,
    ) -> Result<Vec<Appointment>, BookingQueueError> {
        let mut appointments: Vec<Appointment> = self
            .store
            .get_appointments()
            .await?
            .into_iter()
            .filter(|a| a.clinic_id == clinic_id)
            .collect();
        appointments.sort_by_key(|a| a.created_at);
        Ok(appointments)
    }

    pub async fn summary(&self, clinic_id: &str) -> Result<QueueSummary, BookingQueueError> {
        let appointments = self.appointments_for_clinic(clinic_id).await?;
        Ok(QueueSummary::from_appointments(&appointments))
    }

    async fn transition<F>(
        &self,
        appointment_id: &str,
        next: F,
    ) -> Result<(AppointmentStatus, Appointment), BookingQueueError>
    where
        F: FnOnce(AppointmentStatus) -> Result<AppointmentStatus, BookingQueueError>,
    {
        let result = self
            .store
            .modify_appointments(|appointments| {
                let appointment = appointments
                    .iter_mut()
                    .find(|a| a.id == appointment_id)
                    .ok_or_else(|| BookingQueueError::AppointmentNotFound(appointment_id.to_string()))?;
                let before = appointment.status;
                appointment.status = next(before)?;
                Ok::<_, BookingQueueError>((before, appointment.clone()))
            })
            .await;

        if let Err(BookingQueueError::AppointmentNotFound(id)) = &result {
            warn!("Status change requested for unknown appointment {}", id);
        }
        result
    }
}

/// Token for the next booking at `clinic_id` under `policy`.
pub fn next_token(appointments: &[Appointment], clinic_id: &str, policy: TokenPolicy) -> u32 {
    let clinic_appointments = appointments.iter().filter(|a| a.clinic_id == clinic_id);

    let base = match policy {
        TokenPolicy::ActiveCount => clinic_appointments.filter(|a| a.is_active()).count() as u32,
        TokenPolicy::Monotonic => clinic_appointments.map(|a| a.token).max().unwrap_or(0),
    };
    base + 1
}

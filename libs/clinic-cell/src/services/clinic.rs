use tracing::{debug, info};

use shared_database::RecordStore;
use shared_models::{Clinic, ClinicStatus};

use crate::models::ClinicError;

pub const DEMO_CLINIC_ID: &str = "doctor_1";

pub struct ClinicService {
    store: RecordStore,
}

impl ClinicService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// The first clinic record; the only one any flow consults.
    pub async fn active_clinic(&self) -> Result<Option<Clinic>, ClinicError> {
        let clinics = self.store.get_clinics().await?;
        debug!("Loaded {} clinic record(s)", clinics.len());
        Ok(clinics.into_iter().next())
    }

    pub async fn require_active_clinic(&self) -> Result<Clinic, ClinicError> {
        self.active_clinic()
            .await?
            .ok_or(ClinicError::NoClinicConfigured)
    }

    /// Overwrites the status field only. Existing appointments are not touched.
    ///
    /// Only the active clinic can be toggled; other records are never read.
    pub async fn set_clinic_status(
        &self,
        clinic_id: &str,
        status: ClinicStatus,
    ) -> Result<Clinic, ClinicError> {
        let updated = self
            .store
            .modify_clinics(|clinics| {
                let position = clinics
                    .iter()
                    .position(|c| c.id == clinic_id)
                    .ok_or_else(|| ClinicError::NotFound(clinic_id.to_string()))?;
                if position != 0 {
                    return Err(ClinicError::NotActiveClinic(clinic_id.to_string()));
                }
                let clinic = &mut clinics[0];
                clinic.status = status;
                Ok::<_, ClinicError>(clinic.clone())
            })
            .await?;

        info!("Clinic {} is now {:?}", clinic_id, status);
        Ok(updated)
    }

    /// First-run setup: writes the demo clinic when none exists.
    /// Returns whether anything was written.
    pub async fn seed_if_needed(&self) -> Result<bool, ClinicError> {
        let seeded = self
            .store
            .modify_clinics(|clinics| {
                if !clinics.is_empty() {
                    return Ok::<_, ClinicError>(false);
                }
                clinics.push(demo_clinic());
                Ok(true)
            })
            .await?;

        if seeded {
            info!("Seeded demo clinic {}", DEMO_CLINIC_ID);
        } else {
            debug!("Clinic already present, skipping seed");
        }
        Ok(seeded)
    }
}

pub fn demo_clinic() -> Clinic {
    Clinic {
        id: DEMO_CLINIC_ID.to_string(),
        clinic_name: "City Health Clinic".to_string(),
        doctor_name: "Dr. Anil Kumar".to_string(),
        address: "12 Market Road".to_string(),
        paid: true,
        status: ClinicStatus::Open,
        phone: Some("9876543210".to_string()),
        whatsapp: Some("9876543210".to_string()),
        degree: Some("MBBS, MD (General Medicine)".to_string()),
        education: Some("AIIMS, New Delhi".to_string()),
        experience: Some(12),
        avatar: Some(
            "https://images.unsplash.com/photo-1612349317150-e413f6a5b16d?q=80&w=400&auto=format&fit=crop"
                .to_string(),
        ),
    }
}

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use shared_models::{Appointment, Clinic, Session};

use crate::backend::{KeyValueBackend, MemoryBackend};
use crate::error::StoreError;

pub const CLINICS_KEY: &str = "opd_doctors_v1";
pub const APPOINTMENTS_KEY: &str = "opd_appointments_v1";
pub const SESSION_KEY: &str = "opd_session_v1";

/// Typed access to the three persisted records: clinics, appointments and
/// the operator session.
///
/// Plain `get_*`/`save_*` calls are unsynchronised whole-collection
/// reads and writes. The `modify_*` helpers serialise read-modify-write
/// cycles per collection so two concurrent bookings cannot lose an update.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn KeyValueBackend>,
    clinics_lock: Arc<Mutex<()>>,
    appointments_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            clinics_lock: Arc::new(Mutex::new(())),
            appointments_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /* ---------------- clinics ---------------- */

    pub async fn get_clinics(&self) -> Result<Vec<Clinic>, StoreError> {
        self.load_or_default(CLINICS_KEY).await
    }

    pub async fn save_clinics(&self, clinics: &[Clinic]) -> Result<(), StoreError> {
        self.save(CLINICS_KEY, clinics).await
    }

    pub async fn modify_clinics<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<Clinic>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.clinics_lock.lock().await;
        let mut clinics = self.get_clinics().await?;
        let value = f(&mut clinics)?;
        self.save_clinics(&clinics).await?;
        Ok(value)
    }

    /* ---------------- appointments ---------------- */

    pub async fn get_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        self.load_or_default(APPOINTMENTS_KEY).await
    }

    pub async fn save_appointments(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        self.save(APPOINTMENTS_KEY, appointments).await
    }

    /// Runs `f` against the current appointment list and persists the result.
    /// Nothing is written when `f` fails.
    pub async fn modify_appointments<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<Appointment>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.appointments_lock.lock().await;
        let mut appointments = self.get_appointments().await?;
        let value = f(&mut appointments)?;
        self.save_appointments(&appointments).await?;
        Ok(value)
    }

    /* ---------------- session ---------------- */

    pub async fn get_session(&self) -> Result<Option<Session>, StoreError> {
        self.load(SESSION_KEY).await
    }

    pub async fn set_session(&self, session: &Session) -> Result<(), StoreError> {
        self.save(SESSION_KEY, session).await
    }

    pub async fn clear_session(&self) -> Result<(), StoreError> {
        self.backend.remove(SESSION_KEY).await
    }

    /* ---------------- helpers ---------------- */

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StoreError::Serialization {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn load_or_default<T>(&self, key: &str) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    async fn save<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        debug!("Saving record {}", key);
        self.backend.set(key, raw).await
    }
}

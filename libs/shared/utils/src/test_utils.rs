use std::sync::Arc;

use shared_config::{AppConfig, TokenPolicy};
use shared_database::RecordStore;
use shared_models::{Clinic, ClinicStatus, Session};

use crate::state::AppState;

pub const TEST_CLINIC_ID: &str = "clinic_test";

pub struct TestConfig {
    pub status_poll_interval_ms: u64,
    pub token_policy: TokenPolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            status_poll_interval_ms: 20,
            token_policy: TokenPolicy::ActiveCount,
        }
    }
}

impl TestConfig {
    pub fn monotonic() -> Self {
        Self {
            token_policy: TokenPolicy::Monotonic,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            data_dir: None,
            bind_addr: "127.0.0.1:0".to_string(),
            status_poll_interval_ms: self.status_poll_interval_ms,
            token_policy: self.token_policy,
            seed_demo_clinic: false,
        }
    }

    /// In-memory state with nothing stored yet.
    pub fn to_state(&self) -> Arc<AppState> {
        Arc::new(AppState::new(self.to_app_config(), RecordStore::in_memory()))
    }
}

pub struct TestClinic;

impl TestClinic {
    pub fn with_status(status: ClinicStatus) -> Clinic {
        Clinic {
            id: TEST_CLINIC_ID.to_string(),
            clinic_name: "Test OPD".to_string(),
            doctor_name: "Dr. Test".to_string(),
            address: "1 Test Lane".to_string(),
            paid: true,
            status,
            phone: Some("9000000001".to_string()),
            whatsapp: None,
            degree: Some("MBBS".to_string()),
            education: None,
            experience: Some(5),
            avatar: None,
        }
    }

    pub fn open() -> Clinic {
        Self::with_status(ClinicStatus::Open)
    }

    pub fn closed() -> Clinic {
        Self::with_status(ClinicStatus::Closed)
    }
}

/// Fresh in-memory state holding one clinic and, optionally, an operator session.
pub async fn seeded_state(
    config: &TestConfig,
    clinic: Clinic,
    logged_in: bool,
) -> Arc<AppState> {
    let state = config.to_state();

    state
        .store
        .save_clinics(&[clinic])
        .await
        .expect("Failed to save test clinic");

    if logged_in {
        state
            .store
            .set_session(&Session::admin())
            .await
            .expect("Failed to save test session");
    }

    state
}

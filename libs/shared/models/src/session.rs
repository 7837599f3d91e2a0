use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionRole {
    /// The doctor operating the dashboard.
    Admin,
}

/// Marker that a clinic operator is signed in. Gates the dashboard only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub role: SessionRole,
    #[serde(default = "Utc::now")]
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn admin() -> Self {
        Self {
            role: SessionRole::Admin,
            started_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == SessionRole::Admin
    }
}

use serde::{Deserialize, Serialize};

/// Whether the OPD accepts new bookings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClinicStatus {
    Open,
    Closed,
}

impl ClinicStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, ClinicStatus::Open)
    }
}

/// Clinic and owning-doctor profile. Only the first record in the
/// collection is ever consulted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: String,
    pub clinic_name: String,
    pub doctor_name: String,
    pub address: String,
    #[serde(default)]
    pub paid: bool,
    pub status: ClinicStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// WhatsApp number without the leading `+`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    /// Years of practice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    /// Profile photo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Patient is in the waiting area.
    Waiting,
    /// In consultation.
    Processing,
    Completed,
    /// No-show.
    Skipped,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Skipped)
    }

    /// Status after one "next patient" action. Terminal states stay put.
    pub fn advanced(&self) -> AppointmentStatus {
        match self {
            AppointmentStatus::Waiting => AppointmentStatus::Processing,
            AppointmentStatus::Processing => AppointmentStatus::Completed,
            AppointmentStatus::Completed => AppointmentStatus::Completed,
            AppointmentStatus::Skipped => AppointmentStatus::Skipped,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppointmentStatus::Waiting => "waiting",
            AppointmentStatus::Processing => "processing",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// A single OPD booking. Only `status` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Opaque. Older records carry ids like `A1700000000000`.
    pub id: String,
    // Stored under the legacy `doctorId` key.
    #[serde(rename = "doctorId")]
    pub clinic_id: String,

    pub patient_name: String,
    pub mobile: String,
    #[serde(default)]
    pub address: String,

    // Free-form, not checked against clinic hours.
    pub date: String,
    pub time: String,

    pub token: u32,
    pub status: AppointmentStatus,
    #[serde(with = "created_at_millis")]
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Completed
    }
}

/// `createdAt` is stored as epoch milliseconds. RFC 3339 strings are also
/// accepted on read.
mod created_at_millis {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(value.timestamp_millis())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| D::Error::custom(format!("createdAt out of range: {}", ms))),
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORED: &str = r#"{
        "id": "A1700000000000",
        "doctorId": "doctor_1",
        "patientName": "Ravi",
        "mobile": "9000000000",
        "address": "Sector 5",
        "date": "2023-11-14",
        "time": "10:00",
        "token": 3,
        "status": "waiting",
        "createdAt": 1700000000000
    }"#;

    #[test]
    fn test_reads_millisecond_records() {
        let appointment: Appointment = serde_json::from_str(STORED).unwrap();

        assert_eq!(appointment.id, "A1700000000000");
        assert_eq!(appointment.clinic_id, "doctor_1");
        assert_eq!(appointment.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_reads_rfc3339_created_at() {
        let raw = STORED.replace(
            r#""createdAt": 1700000000000"#,
            r#""createdAt": "2023-11-14T22:13:20Z""#,
        );
        let appointment: Appointment = serde_json::from_str(&raw).unwrap();

        assert_eq!(appointment.created_at.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_writes_created_at_as_millis() {
        let appointment: Appointment = serde_json::from_str(STORED).unwrap();

        let value = serde_json::to_value(&appointment).unwrap();
        assert_eq!(value["createdAt"], 1_700_000_000_000i64);
        assert_eq!(value["doctorId"], "doctor_1");
    }
}

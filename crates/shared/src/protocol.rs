use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AppointmentId, DoctorId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub speciality: String,
}

/// Body of `POST /doctors` and `PUT /doctors/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorDraft {
    pub name: String,
    pub speciality: String,
}

impl DoctorDraft {
    pub fn new(name: impl Into<String>, speciality: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            speciality: speciality.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.speciality.is_empty()
    }
}

impl From<&Doctor> for DoctorDraft {
    fn from(doctor: &Doctor) -> Self {
        Self {
            name: doctor.name.clone(),
            speciality: doctor.speciality.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    #[serde(with = "iso_timestamp")]
    pub date: DateTime<Utc>,
    pub patient: PersonRef,
    pub doctor: PersonRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub count: u64,
}

/// Response of `GET /dashboard/`. The backend names the series `chartData`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_appointment: u64,
    pub total_patient: u64,
    pub revenue_data: f64,
    #[serde(rename = "chartData", default)]
    pub series: Vec<ChartPoint>,
}

/// Tolerant ISO-8601 decoding for backend timestamps.
///
/// Accepts RFC 3339 (`2024-03-07T09:05:00.000Z`), offset-less date-times
/// (taken as UTC) and bare dates (midnight UTC). Always serializes as RFC 3339.
pub mod iso_timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        for format in NAIVE_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(parsed.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid ISO timestamp '{raw}'")))
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;

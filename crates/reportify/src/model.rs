//! Domain records as they appear on the wire.
//!
//! Field names follow the JSON contract used by the web client (`_id`,
//! `judulKP`, `dailyReportId`, ...). Dates are serialized as RFC 3339 UTC
//! with millisecond precision and accepted either as a calendar date or a
//! full timestamp.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A login account, created on first authenticated visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub nama: String,
    /// Role strings exactly as issued by the identity provider.
    #[serde(rename = "role", default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub nama: String,
    pub roles: Vec<String>,
}

/// One activity entry inside a daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaItem {
    pub waktu_mulai: String,
    pub waktu_selesai: String,
    pub judul_agenda: String,
    pub deskripsi_agenda: String,
    /// Attachment URLs.
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(with = "wire_date")]
    pub tanggal: DateTime<Utc>,
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDailyReport {
    pub tanggal: DateTime<Utc>,
    pub agenda: Vec<AgendaItem>,
}

/// Partial update of a daily report. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyReportPatch {
    pub tanggal: Option<DateTime<Utc>>,
    pub agenda: Option<Vec<AgendaItem>>,
}

/// A guidance (bimbingan) session recorded by an academic advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidanceSession {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub nip: Option<String>,
    #[serde(with = "wire_date")]
    pub tanggal: DateTime<Utc>,
    pub komentar: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGuidanceSession {
    pub nip: String,
    pub tanggal: DateTime<Utc>,
    pub komentar: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidancePatch {
    pub nip: Option<String>,
    pub tanggal: Option<DateTime<Utc>>,
    pub komentar: Option<String>,
    pub status: Option<String>,
}

/// An institution supervisor's verdict on one daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    #[serde(rename = "_id")]
    pub id: String,
    pub daily_report_id: String,
    pub nip: String,
    pub komentar: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvaluation {
    pub daily_report_id: String,
    pub nip: String,
    pub komentar: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationPatch {
    pub daily_report_id: Option<String>,
    pub nip: Option<String>,
    pub komentar: Option<String>,
    pub status: Option<String>,
}

/// Institution supervisor (pembimbing instansi) profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub nip: String,
    pub nama: String,
    pub instansi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jabatan_instansi: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorFields {
    pub email: String,
    pub nip: String,
    pub nama: String,
    pub instansi: String,
    pub jabatan_instansi: Option<String>,
}

/// A student's internship profile with its reports and guidance sessions
/// resolved in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub nim: String,
    pub nama: String,
    #[serde(rename = "judulKP")]
    pub judul_kp: String,
    pub instansi: String,
    #[serde(rename = "pembimbingInstansi")]
    pub pembimbing_instansi: String,
    #[serde(rename = "dosenPembimbing")]
    pub dosen_pembimbing: String,
    #[serde(rename = "mulaiKP", with = "wire_date")]
    pub mulai_kp: DateTime<Utc>,
    #[serde(
        rename = "selesaiKP",
        with = "wire_date_opt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub selesai_kp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reports: Vec<DailyReport>,
    #[serde(default)]
    pub bimbingan: Vec<GuidanceSession>,
}

/// Scalar profile fields, used for both creation and full overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentFields {
    pub email: String,
    pub nim: String,
    pub nama: String,
    pub judul_kp: String,
    pub instansi: String,
    pub pembimbing_instansi: String,
    pub dosen_pembimbing: String,
    pub mulai_kp: DateTime<Utc>,
    pub selesai_kp: Option<DateTime<Utc>>,
}

/// Parses a client-supplied date.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]` local-less
/// timestamps (read as UTC), and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a date the way every response carries it.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

mod wire_date {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}

mod wire_date_opt {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&super::format_date(v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_date(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: {raw}"))),
        }
    }
}

//! Request payload checks.
//!
//! Payloads arrive as loosely typed JSON. A field counts as missing when it
//! is absent, `null`, `false`, `0` or an empty string, matching what the web
//! client has always sent for "not filled in". Presence checks run in the
//! listed order and report the first missing field.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{
    parse_date, AgendaItem, DailyReportPatch, EvaluationPatch, GuidancePatch, NewAccount,
    NewDailyReport, NewEvaluation, NewGuidanceSession, StudentFields, SupervisorFields,
};

type Checked<T> = Result<T, ValidationError>;

/// Whether `value` is filled in.
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Fails with the first of `fields` that is missing from `body`.
pub fn require(body: &Value, fields: &[&str]) -> Checked<()> {
    match fields.iter().find(|f| !is_present(body.get(**f))) {
        Some(missing) => Err(ValidationError::missing(*missing)),
        None => Ok(()),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// A required scalar, coerced to text.
pub fn text(body: &Value, field: &str) -> Checked<String> {
    if !is_present(body.get(field)) {
        return Err(ValidationError::missing(field));
    }
    body.get(field)
        .and_then(as_text)
        .ok_or_else(|| ValidationError::invalid(field, "expected a string"))
}

/// An optional scalar; missing values read as `None`.
pub fn optional_text(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .filter(|v| is_present(Some(v)))
        .and_then(as_text)
}

/// A field the client explicitly sent, even if blank. Used by partial
/// updates where `""` overwrites.
fn sent_text(body: &Value, field: &str) -> Checked<Option<String>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_text(v)
            .or_else(|| matches!(v, Value::Bool(false)).then(|| "false".to_string()))
            .map(Some)
            .ok_or_else(|| ValidationError::invalid(field, "expected a string")),
    }
}

pub fn date(body: &Value, field: &str) -> Checked<DateTime<Utc>> {
    let raw = text(body, field)?;
    parse_date(&raw).ok_or_else(|| ValidationError::invalid(field, "expected a date"))
}

pub fn optional_date(body: &Value, field: &str) -> Checked<Option<DateTime<Utc>>> {
    match optional_text(body, field) {
        None => Ok(None),
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| ValidationError::invalid(field, "expected a date")),
    }
}

/// A list of role names. Non-string entries are dropped.
pub fn string_list(body: &Value, field: &str) -> Vec<String> {
    match body.get(field) {
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

const AGENDA_FIELDS: [&str; 4] = ["waktuMulai", "waktuSelesai", "judulAgenda", "deskripsiAgenda"];

/// Agenda items. `None` when the field was not sent at all.
pub fn agenda(body: &Value, field: &str) -> Checked<Option<Vec<AgendaItem>>> {
    let items = match body.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ValidationError::invalid(field, "expected a list")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if let Some(missing) = AGENDA_FIELDS.iter().find(|f| !is_present(item.get(**f))) {
                return Err(ValidationError::missing(format!("{field}[{i}].{missing}")));
            }
            Ok(AgendaItem {
                waktu_mulai: text(item, "waktuMulai")?,
                waktu_selesai: text(item, "waktuSelesai")?,
                judul_agenda: text(item, "judulAgenda")?,
                deskripsi_agenda: text(item, "deskripsiAgenda")?,
                files: string_list(item, "files"),
            })
        })
        .collect::<Checked<Vec<_>>>()
        .map(Some)
}

pub fn new_account(body: &Value) -> Checked<NewAccount> {
    require(body, &["email", "nama"])?;
    Ok(NewAccount {
        email: text(body, "email")?,
        nama: text(body, "nama")?,
        roles: string_list(body, "role"),
    })
}

pub fn student_fields(body: &Value) -> Checked<StudentFields> {
    require(
        body,
        &[
            "email",
            "nim",
            "nama",
            "judulKP",
            "instansi",
            "pembimbingInstansi",
            "dosenPembimbing",
            "mulaiKP",
        ],
    )?;
    Ok(StudentFields {
        email: text(body, "email")?,
        nim: text(body, "nim")?,
        nama: text(body, "nama")?,
        judul_kp: text(body, "judulKP")?,
        instansi: text(body, "instansi")?,
        pembimbing_instansi: text(body, "pembimbingInstansi")?,
        dosen_pembimbing: text(body, "dosenPembimbing")?,
        mulai_kp: date(body, "mulaiKP")?,
        selesai_kp: optional_date(body, "selesaiKP")?,
    })
}

pub fn supervisor_fields(body: &Value) -> Checked<SupervisorFields> {
    require(body, &["email", "nip", "nama", "instansi"])?;
    Ok(SupervisorFields {
        email: text(body, "email")?,
        nip: text(body, "nip")?,
        nama: text(body, "nama")?,
        instansi: text(body, "instansi")?,
        jabatan_instansi: optional_text(body, "jabatanInstansi"),
    })
}

pub fn new_daily_report(body: &Value) -> Checked<NewDailyReport> {
    require(body, &["email", "tanggal"])?;
    Ok(NewDailyReport {
        tanggal: date(body, "tanggal")?,
        agenda: agenda(body, "agenda")?.unwrap_or_default(),
    })
}

pub fn daily_report_patch(body: &Value) -> Checked<DailyReportPatch> {
    let tanggal = match sent_text(body, "tanggal")? {
        Some(raw) => Some(
            parse_date(&raw).ok_or_else(|| ValidationError::invalid("tanggal", "expected a date"))?,
        ),
        None => None,
    };
    Ok(DailyReportPatch {
        tanggal,
        agenda: agenda(body, "agenda")?,
    })
}

pub fn new_guidance(body: &Value) -> Checked<NewGuidanceSession> {
    require(body, &["nip", "tanggal", "komentar", "status"])?;
    Ok(NewGuidanceSession {
        nip: text(body, "nip")?,
        tanggal: date(body, "tanggal")?,
        komentar: text(body, "komentar")?,
        status: text(body, "status")?,
    })
}

pub fn guidance_patch(body: &Value) -> Checked<GuidancePatch> {
    let tanggal = match sent_text(body, "tanggal")? {
        Some(raw) => Some(
            parse_date(&raw).ok_or_else(|| ValidationError::invalid("tanggal", "expected a date"))?,
        ),
        None => None,
    };
    Ok(GuidancePatch {
        nip: sent_text(body, "nip")?,
        tanggal,
        komentar: sent_text(body, "komentar")?,
        status: sent_text(body, "status")?,
    })
}

pub fn new_evaluation(body: &Value) -> Checked<NewEvaluation> {
    require(body, &["dailyReportId", "nip", "komentar", "status"])?;
    Ok(NewEvaluation {
        daily_report_id: text(body, "dailyReportId")?,
        nip: text(body, "nip")?,
        komentar: text(body, "komentar")?,
        status: text(body, "status")?,
    })
}

pub fn evaluation_patch(body: &Value) -> Checked<EvaluationPatch> {
    Ok(EvaluationPatch {
        daily_report_id: sent_text(body, "dailyReportId")?,
        nip: sent_text(body, "nip")?,
        komentar: sent_text(body, "komentar")?,
        status: sent_text(body, "status")?,
    })
}

/// The `_id` of an update payload.
pub fn record_id(body: &Value) -> Checked<String> {
    optional_text(body, "_id").ok_or_else(|| ValidationError::Rejected("ID (_id) is required".into()))
}

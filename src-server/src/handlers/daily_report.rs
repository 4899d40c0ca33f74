//! Daily report handlers.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use reportify::{
    db::{evaluation_repo, report_repo, student_repo},
    model::DailyReport,
    tracking::{is_editable, merged_status, printout, report_rows},
    validate, Operation,
};
use serde::{Deserialize, Serialize};

use super::{created, filled};
use crate::{auth::Caller, body::JsonBody, error::ApiError, state::AppState};

const EMAIL_REQUIRED: &str = "Email diperlukan";
const STUDENT_NOT_FOUND: &str = "Mahasiswa tidak ditemukan";
const REPORT_NOT_FOUND: &str = "DailyReport not found";
const AGENDA_FROZEN: &str = "Laporan sudah diterima, agenda tidak dapat diubah";

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Saved {
    pub message: &'static str,
    pub data: DailyReport,
}

fn required_email(query: &ReportQuery) -> Result<String, ApiError> {
    filled(&query.email)
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request(EMAIL_REQUIRED))
}

/// Reports of the student `?email=`, in submission order.
pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::ReportRead)?;
    let email = required_email(&query)?;
    caller.ensure_owner(&email)?;

    let reports = state
        .query(move |db| report_repo::find_by_student(db, &email))
        .await?
        .ok_or_else(|| ApiError::not_found(STUDENT_NOT_FOUND))?;
    Ok(Json(reports).into_response())
}

/// Overview rows for the student `?email=`: each report with the status
/// and comment of its evaluation.
pub async fn status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::ReportRead)?;
    let email = required_email(&query)?;
    caller.ensure_owner(&email)?;

    let rows = state
        .query(move |db| {
            let Some(reports) = report_repo::find_by_student(db, &email)? else {
                return Ok(None);
            };
            let ids: Vec<String> = reports.iter().map(|r| r.id.clone()).collect();
            let evaluations = evaluation_repo::find_by_reports(db, &ids)?;
            Ok(Some(report_rows(&reports, &evaluations)))
        })
        .await?
        .ok_or_else(|| ApiError::not_found(STUDENT_NOT_FOUND))?;
    Ok(Json(rows).into_response())
}

/// Printable report of the student `?email=`: profile header plus every
/// report with its evaluation note and attachments.
pub async fn laporan(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::ReportRead)?;
    let email = required_email(&query)?;
    caller.ensure_owner(&email)?;

    let document = state
        .query(move |db| {
            let Some(student) = student_repo::find_by_email(db, &email)? else {
                return Ok(None);
            };
            let ids: Vec<String> = student.reports.iter().map(|r| r.id.clone()).collect();
            let evaluations = evaluation_repo::find_by_reports(db, &ids)?;
            Ok(Some(printout(&student, &evaluations)))
        })
        .await?
        .ok_or_else(|| ApiError::not_found(STUDENT_NOT_FOUND))?;
    Ok(Json(document).into_response())
}

/// Save a report and append it to the student's list.
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::ReportCreate)?;
    let new = validate::new_daily_report(&body)?;
    let email = validate::text(&body, "email")?;
    caller.ensure_self(&email)?;

    let report = state
        .query(move |db| report_repo::create_for_student(db, &email, &new))
        .await?
        .ok_or_else(|| ApiError::not_found("Mahasiswa tidak ditemukan."))?;
    Ok(created(Saved {
        message: "Laporan berhasil disimpan",
        data: report,
    }))
}

/// Update the fields sent for the report `_id`. The agenda of an accepted
/// report cannot change.
pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::ReportUpdate)?;
    let id = validate::record_id(&body)?;
    let patch = validate::daily_report_patch(&body)?;

    let updated = state
        .run(move |db| {
            let Some(owner) = report_repo::owner_email(db, &id)? else {
                return Ok(None);
            };
            caller.ensure_self(&owner)?;

            if patch.agenda.is_some() {
                let evaluations = evaluation_repo::find_by_report(db, &id)?;
                if !is_editable(&merged_status(&id, &evaluations).status) {
                    return Err(ApiError::bad_request(AGENDA_FROZEN));
                }
            }

            Ok(report_repo::update(db, &id, &patch)?)
        })
        .await?
        .ok_or_else(|| ApiError::not_found(REPORT_NOT_FOUND))?;
    Ok(Json(updated).into_response())
}

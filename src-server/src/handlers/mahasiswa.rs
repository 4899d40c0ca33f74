//! Student profile handlers.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use reportify::{
    db::student_repo,
    tracking::{progress, semester_from_nim, Progress},
    validate, AuthError, Operation,
};
use serde::{Deserialize, Serialize};

use super::{filled, upserted};
use crate::{auth::Caller, body::JsonBody, error::ApiError, state::AppState};

const NOT_FOUND: &str = "Mahasiswa not found.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MahasiswaQuery {
    email: Option<String>,
    pembimbing_instansi: Option<String>,
    dosen_pembimbing: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    email: Option<String>,
}

/// Create the caller's profile, or return it unchanged if it exists.
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::StudentCreate)?;
    validate::require(&body, &["email"])?;
    let email = validate::text(&body, "email")?;
    caller.ensure_self(&email)?;

    if let Some(existing) = state
        .query(move |db| student_repo::find_by_email(db, &email))
        .await?
    {
        return Ok(Json(existing).into_response());
    }

    let fields = validate::student_fields(&body)?;
    let result = state
        .query(move |db| student_repo::create_or_fetch(db, &fields))
        .await?;
    Ok(upserted(result))
}

/// Look up profiles by `email`, `pembimbingInstansi` or `dosenPembimbing`,
/// in that order of precedence, or list them all.
pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<MahasiswaQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::StudentRead)?;

    if let Some(email) = filled(&query.email).map(str::to_string) {
        caller.ensure_owner(&email)?;
        let profile = state
            .query(move |db| student_repo::find_by_email(db, &email))
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(Json(profile).into_response());
    }

    // Students only ever see their own profile.
    if caller.is_student_only() {
        return Err(AuthError::NotOwner.into());
    }

    let profiles = if let Some(name) = filled(&query.pembimbing_instansi).map(str::to_string) {
        state
            .query(move |db| student_repo::find_by_supervisor(db, &name))
            .await?
    } else if let Some(name) = filled(&query.dosen_pembimbing).map(str::to_string) {
        state
            .query(move |db| student_repo::find_by_advisor(db, &name))
            .await?
    } else {
        state.query(student_repo::find_all).await?
    };
    Ok(Json(profiles).into_response())
}

/// Overwrite every scalar field of a profile. Reports and guidance
/// sessions are kept.
pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::StudentUpdate)?;
    validate::require(&body, &["email"])?;
    caller.ensure_self(&validate::text(&body, "email")?)?;

    let fields = validate::student_fields(&body)?;
    let profile = state
        .query(move |db| student_repo::update_profile(db, &fields))
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(Json(profile).into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub email: String,
    pub nama: String,
    pub semester: Option<u32>,
    #[serde(flatten)]
    pub progress: Progress,
}

/// Internship progress of the student `?email=` as of today.
pub async fn progres(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<EmailQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::StudentProgressRead)?;
    let email = filled(&query.email)
        .map(str::to_string)
        .ok_or_else(|| ApiError::bad_request("Email diperlukan"))?;
    caller.ensure_owner(&email)?;

    let student = state
        .query(move |db| student_repo::find_by_email(db, &email))
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    let today = Utc::now();
    Ok(Json(StudentProgress {
        semester: semester_from_nim(&student.nim, today),
        progress: progress(student.mulai_kp, student.selesai_kp, today),
        email: student.email,
        nama: student.nama,
    })
    .into_response())
}

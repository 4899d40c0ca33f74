//! Guidance session handlers.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use reportify::{db::guidance_repo, validate, Operation};

use super::created;
use crate::{auth::Caller, body::JsonBody, error::ApiError, state::AppState};

const STUDENT_NOT_FOUND: &str = "Mahasiswa tidak ditemukan";

pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::GuidanceRead)?;
    let sessions = state.query(guidance_repo::find_all).await?;
    Ok(Json(sessions).into_response())
}

/// Record a session and append it to the student `emailMahasiswa`.
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::GuidanceCreate)?;
    let new = validate::new_guidance(&body)?;
    let Some(email) = validate::optional_text(&body, "emailMahasiswa") else {
        return Err(ApiError::not_found(STUDENT_NOT_FOUND));
    };

    let session = state
        .query(move |db| guidance_repo::create_for_student(db, &email, &new))
        .await?
        .ok_or_else(|| ApiError::not_found(STUDENT_NOT_FOUND))?;
    Ok(created(session))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::GuidanceUpdate)?;
    let id = validate::record_id(&body)?;
    let patch = validate::guidance_patch(&body)?;

    let session = state
        .query(move |db| guidance_repo::update(db, &id, &patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Bimbingan not found"))?;
    Ok(Json(session).into_response())
}

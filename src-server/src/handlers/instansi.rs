//! Institution supervisor profile handlers.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use reportify::{db::supervisor_repo, validate, Operation};
use serde::Deserialize;

use super::{filled, upserted};
use crate::{auth::Caller, body::JsonBody, error::ApiError, state::AppState};

const NOT_FOUND: &str = "Instansi not found.";

#[derive(Debug, Deserialize)]
pub struct InstansiQuery {
    email: Option<String>,
    instansi: Option<String>,
}

/// Create the caller's supervisor profile, or return it if it exists.
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::SupervisorCreate)?;
    validate::require(&body, &["email"])?;
    let email = validate::text(&body, "email")?;
    caller.ensure_self(&email)?;

    if let Some(existing) = state
        .query(move |db| supervisor_repo::find_by_email(db, &email))
        .await?
    {
        return Ok(Json(existing).into_response());
    }

    let fields = validate::supervisor_fields(&body)?;
    let result = state
        .query(move |db| supervisor_repo::create_or_fetch(db, &fields))
        .await?;
    Ok(upserted(result))
}

/// One profile by `?email=` or `?instansi=`, else all of them.
pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<InstansiQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::SupervisorRead)?;

    if let Some(email) = filled(&query.email).map(str::to_string) {
        let profile = state
            .query(move |db| supervisor_repo::find_by_email(db, &email))
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(Json(profile).into_response());
    }

    if let Some(instansi) = filled(&query.instansi).map(str::to_string) {
        let profile = state
            .query(move |db| supervisor_repo::find_by_instansi(db, &instansi))
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
        return Ok(Json(profile).into_response());
    }

    let profiles = state.query(supervisor_repo::find_all).await?;
    Ok(Json(profiles).into_response())
}

/// Overwrite the caller's own supervisor profile.
pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::SupervisorUpdate)?;
    validate::require(&body, &["email"])?;
    caller.ensure_self(&validate::text(&body, "email")?)?;
    let fields = validate::supervisor_fields(&body)?;

    let profile = state
        .query(move |db| supervisor_repo::update(db, &fields))
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;
    Ok(Json(profile).into_response())
}

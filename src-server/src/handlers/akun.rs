//! Login account handlers.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use reportify::{db::account_repo, validate, Operation};
use serde::Deserialize;

use super::{filled, upserted};
use crate::{auth::Caller, body::JsonBody, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct AkunQuery {
    role: Option<String>,
}

/// Create the caller's account, or return it unchanged if it exists.
///
/// Roles are taken from the verified token, never from the body.
pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::AccountCreate)?;
    validate::require(&body, &["email"])?;
    let email = validate::text(&body, "email")?;
    caller.ensure_self(&email)?;

    if let Some(existing) = state
        .query(move |db| account_repo::find_by_email(db, &email))
        .await?
    {
        return Ok(Json(existing).into_response());
    }

    let mut new = validate::new_account(&body)?;
    new.roles = caller.raw_roles.clone();
    let result = state
        .query(move |db| account_repo::create_or_fetch(db, &new))
        .await?;
    Ok(upserted(result))
}

/// List accounts holding `?role=`.
pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<AkunQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::AccountList)?;
    let Some(role) = filled(&query.role).map(str::to_string) else {
        return Err(ApiError::bad_request("Invalid query parameter."));
    };

    let lookup = role.clone();
    let accounts = state
        .query(move |db| account_repo::find_by_role(db, &lookup))
        .await?;
    if accounts.is_empty() {
        return Err(ApiError::not_found(format!("No Akun found with role: {role}")));
    }
    Ok(Json(accounts).into_response())
}

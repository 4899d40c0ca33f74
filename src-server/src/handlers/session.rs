//! The caller's session: who they are and where they may go.

use axum::{
    extract::{Query, State},
    Json,
};
use reportify::{
    auth::{accessible_pages, guard_path, landing_path, GuardOutcome},
    Identity, Operation,
};
use serde::{Deserialize, Serialize};

use crate::{auth::Caller, error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(flatten)]
    pub identity: Identity,
    pub landing: &'static str,
    pub pages: Vec<&'static str>,
    /// What the page at `?path=` should do for this caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard: Option<GuardOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_signature_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    path: Option<String>,
}

pub async fn show(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<SessionQuery>,
) -> Result<Json<Session>, ApiError> {
    caller.authorize(Operation::SessionRead)?;
    let roles = caller.roles();

    Ok(Json(Session {
        landing: landing_path(&roles),
        pages: accessible_pages(&roles),
        guard: query.path.as_deref().map(|path| guard_path(path, true, &roles)),
        upload_signature_endpoint: state.config.uploads.signature_endpoint.clone(),
        identity: caller,
    }))
}

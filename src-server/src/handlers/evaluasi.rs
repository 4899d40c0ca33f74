//! Evaluation handlers.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use reportify::{db::evaluation_repo, validate, Operation};
use serde::Deserialize;

use super::{created, filled};
use crate::{auth::Caller, body::JsonBody, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct EvaluasiQuery {
    #[serde(rename = "dailyReportId", alias = "dailyreportId")]
    daily_report_id: Option<String>,
}

/// All evaluations, or those of `?dailyReportId=`.
pub async fn list(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<EvaluasiQuery>,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::EvaluationRead)?;

    let evaluations = match filled(&query.daily_report_id).map(str::to_string) {
        Some(report_id) => {
            state
                .query(move |db| evaluation_repo::find_by_report(db, &report_id))
                .await?
        }
        None => state.query(evaluation_repo::find_all).await?,
    };
    Ok(Json(evaluations).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::EvaluationCreate)?;
    let new = validate::new_evaluation(&body)?;

    let evaluation = state
        .query(move |db| evaluation_repo::insert(db, &new))
        .await?;
    Ok(created(evaluation))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(caller): Caller,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    caller.authorize(Operation::EvaluationUpdate)?;
    let id = validate::record_id(&body)?;
    let patch = validate::evaluation_patch(&body)?;

    let evaluation = state
        .query(move |db| evaluation_repo::update(db, &id, &patch))
        .await?
        .ok_or_else(|| ApiError::not_found("Evaluasi not found"))?;
    Ok(Json(evaluation).into_response())
}

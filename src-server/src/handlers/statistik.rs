//! Coordinator statistics handler.

use axum::{extract::State, Json};
use chrono::Utc;
use reportify::{
    db::student_repo,
    tracking::{compute_statistics, Statistics},
    Operation,
};

use crate::{auth::Caller, error::ApiError, state::AppState};

/// Coordinator dashboard figures over every student.
pub async fn show(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Statistics>, ApiError> {
    caller.authorize(Operation::StatisticsRead)?;
    let students = state.query(student_repo::find_all).await?;
    Ok(Json(compute_statistics(&students, Utc::now())))
}

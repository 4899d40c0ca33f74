//! REST handlers for the Reportify API.
//!
//! Handlers are organized by resource:
//! - `akun`: login accounts
//! - `mahasiswa`: student profiles and progress
//! - `daily_report`: daily reports, their evaluation status and the
//!   printable report
//! - `bimbingan`: guidance sessions
//! - `evaluasi`: report evaluations
//! - `instansi`: institution supervisor profiles
//! - `statistik`: coordinator statistics
//! - `session`: the caller's session view

pub mod akun;
pub mod bimbingan;
pub mod daily_report;
pub mod evaluasi;
pub mod instansi;
pub mod mahasiswa;
pub mod session;
pub mod statistik;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reportify::Upserted;
use serde::Serialize;
use serde_json::{json, Value};

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 201 for a new record, 200 for one that already existed.
fn upserted<T: Serialize>(result: Upserted<T>) -> Response {
    let status = if result.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(result.into_inner())).into_response()
}

fn created<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

/// A query parameter that was sent with a non-empty value.
fn filled(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|v| !v.is_empty())
}

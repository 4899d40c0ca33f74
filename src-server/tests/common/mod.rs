//! Shared helpers for API tests: an in-memory store, fixed tokens and a
//! one-shot request driver.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use reportify::{auth::StaticIdentityProvider, Config, Database, Identity};
use reportify_server::{build_router, state::AppState};

pub const STUDENT_A: &str = "token-student-a";
pub const STUDENT_B: &str = "token-student-b";
pub const ADVISOR: &str = "token-dosen";
pub const SUPERVISOR: &str = "token-instansi";
pub const COORDINATOR: &str = "token-koordinator";
pub const NO_ROLE: &str = "token-no-role";
pub const OTHER_SUPERVISOR: &str = "token-instansi-lain";
/// A student who also holds an advisor role.
pub const STUDENT_ADVISOR: &str = "token-student-dosen";

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let db = Database::open_in_memory().expect("Failed to open test database");
        let provider = StaticIdentityProvider::new()
            .with_token(STUDENT_A, Identity::new("a@x.com", "Ani", &["mahasiswa"]))
            .with_token(STUDENT_B, Identity::new("b@x.com", "Budi", &["mahasiswa"]))
            .with_token(
                ADVISOR,
                Identity::new("rina@kampus.ac.id", "Bu Rina", &["dosen-pembimbing"]),
            )
            .with_token(
                SUPERVISOR,
                Identity::new("joko@maju.co.id", "Pak Joko", &["pembimbing-instansi"]),
            )
            .with_token(
                COORDINATOR,
                Identity::new("koor@kampus.ac.id", "Pak Koor", &["koordinator"]),
            )
            .with_token(
                OTHER_SUPERVISOR,
                Identity::new("eve@lain.co.id", "Eve", &["pembimbing-instansi"]),
            )
            .with_token(
                STUDENT_ADVISOR,
                Identity::new("c@x.com", "Citra", &["mahasiswa", "dosen-pembimbing"]),
            )
            .with_token(NO_ROLE, Identity::new("x@x.com", "X", &["offline_access"]));

        let state = AppState::new(db.clone(), Arc::new(provider), config);
        Self {
            router: build_router(state),
            db,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let body = body.map(|b| b.to_string()).unwrap_or_default();
        self.send_raw(method, uri, token, body).await
    }

    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if !body.is_empty() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder.body(Body::from(body)).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    /// Creates the profile of b@x.com (Budi) as that student.
    pub async fn seed_student_b(&self) -> Value {
        let (status, body) = self.post("/api/mahasiswa", STUDENT_B, student_body("b@x.com")).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    /// Submits a one-item report for b@x.com and returns its `_id`.
    pub async fn seed_report(&self, tanggal: &str) -> String {
        let (status, body) = self
            .post(
                "/api/daily-report",
                STUDENT_B,
                json!({
                    "email": "b@x.com",
                    "tanggal": tanggal,
                    "agenda": [agenda_item("Rapat")],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["_id"].as_str().unwrap().to_string()
    }
}

pub fn student_body(email: &str) -> Value {
    json!({
        "email": email,
        "nim": "12210111",
        "nama": "Budi",
        "judulKP": "Sistem Pelaporan",
        "instansi": "PT Maju Jaya",
        "pembimbingInstansi": "Pak Joko",
        "dosenPembimbing": "Bu Rina",
        "mulaiKP": "2024-01-01",
        "selesaiKP": "2024-03-01",
    })
}

pub fn agenda_item(title: &str) -> Value {
    json!({
        "waktuMulai": "08:00",
        "waktuSelesai": "12:00",
        "judulAgenda": title,
        "deskripsiAgenda": format!("Mengerjakan {title}"),
    })
}

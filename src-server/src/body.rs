//! Loosely typed JSON request bodies.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::ApiError;

/// A JSON request body, kept untyped so that field checks can name the
/// missing field. A body that is not valid JSON is a server-side failure
/// carrying the parser's message.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Internal(e.body_text()))?;
        let value = serde_json::from_slice(&bytes).map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok(JsonBody(value))
    }
}

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Failures a record handler reports back to the browser.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("invalid JSON body: {0}")]
    InvalidJson(String),
    #[error("store rejected the record")]
    Upstream { detail: Value },
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Rejected { detail, .. } => GatewayError::Upstream { detail },
            StoreError::Transport(msg) => GatewayError::Internal(msg),
        }
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            GatewayError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            GatewayError::InvalidJson(_) => json!({ "error": "Invalid JSON" }),
            GatewayError::Upstream { detail } => {
                json!({ "error": "Failed to save to Airtable", "detail": detail })
            }
            // Transport details stay in the logs.
            GatewayError::Internal(_) => json!({ "error": "Internal server error" }),
        };
        (status, Json(body)).into_response()
    }
}

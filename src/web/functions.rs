//! Record gateway: one handler per store table, mounted where the site's
//! forms post to.

use crate::domain::{AarSubmission, LeadLink, LeadSubmission, QuizSubmission, Submission};
use crate::error::GatewayError;
use crate::state::SharedState;
use crate::store::RecordStore;
use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower_http::set_header::SetResponseHeaderLayer;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/signup", any(record::<LeadSubmission>))
        .route("/aar", any(record::<AarSubmission>))
        .route("/quiz", any(record::<QuizSubmission>))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(state)
}

async fn record<S>(method: Method, State(state): State<SharedState>, body: Bytes) -> Response
where
    S: Submission + 'static,
{
    if method == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }

    tracing::debug!("[{}] invoked, method: {}", S::KIND, method);
    match insert::<S>(&state, &method, &body).await {
        Ok(record_id) => {
            match record_id {
                Some(id) => tracing::info!("[{}] created {} record {}", S::KIND, S::TABLE, id),
                None => tracing::info!("[{}] created {} record, no id returned", S::KIND, S::TABLE),
            }
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(err) => {
            match &err {
                GatewayError::Upstream { detail } => {
                    tracing::error!("[{}] store rejected record: {}", S::KIND, detail)
                }
                GatewayError::Internal(msg) => tracing::error!("[{}] function error: {}", S::KIND, msg),
                other => tracing::warn!("[{}] rejected request: {}", S::KIND, other),
            }
            err.into_response()
        }
    }
}

async fn insert<S: Submission>(
    state: &SharedState,
    method: &Method,
    body: &[u8],
) -> Result<Option<String>, GatewayError> {
    if method != Method::POST {
        return Err(GatewayError::MethodNotAllowed);
    }

    let submission: S = decode(body)?;
    // The insert payload depends on the link, so the lookup finishes first.
    let lead_id = resolve_lead(state.store.as_ref(), submission.lead_link()).await;
    let fields = submission.into_fields(Utc::now().date_naive(), lead_id.as_deref());

    let outgoing = Value::Object(fields.clone());
    tracing::debug!("[{}] fields to send: {}", S::KIND, outgoing);
    let record_id = state.store.create_record(S::TABLE, fields).await?;
    Ok(record_id)
}

/// Parses a form post. The top level must be a JSON object.
pub fn decode<S: DeserializeOwned>(body: &[u8]) -> Result<S, GatewayError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| GatewayError::InvalidJson(e.to_string()))?;
    if !value.is_object() {
        return Err(GatewayError::InvalidJson("body is not a JSON object".to_string()));
    }
    serde_json::from_value(value).map_err(|e| GatewayError::InvalidJson(e.to_string()))
}

/// Finds the Lead a record should point at. Never fails: an unresolved link
/// just leaves the record unlinked.
pub async fn resolve_lead(store: &dyn RecordStore, link: LeadLink) -> Option<String> {
    match link {
        LeadLink::None => None,
        LeadLink::RecordId(id) => Some(id),
        LeadLink::Unresolvable => {
            tracing::debug!("No email or lead reference, skipping lead lookup");
            None
        }
        LeadLink::Email(email) => match store.find_lead_by_email(&email).await {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                tracing::debug!("No lead matches the submitted email");
                None
            }
            Err(e) => {
                tracing::warn!("Lead lookup failed, continuing without link: {}", e);
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(matches!(
            decode::<LeadSubmission>(b"not json"),
            Err(GatewayError::InvalidJson(_))
        ));
        assert!(matches!(
            decode::<LeadSubmission>(b"[1, 2]"),
            Err(GatewayError::InvalidJson(_))
        ));
        assert!(matches!(
            decode::<QuizSubmission>(b""),
            Err(GatewayError::InvalidJson(_))
        ));
        assert!(decode::<AarSubmission>(br#"{"event_name":"Fair"}"#).is_ok());
    }
}

use super::{Fields, RecordStore, StoreError, LEADS_TABLE};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<RecordRef>,
}

#[derive(Deserialize)]
struct RecordRef {
    id: String,
}

/// REST client for an Airtable base.
#[derive(Clone)]
pub struct AirtableStore {
    client: reqwest::Client,
    api_url: String,
    base_id: String,
    token: String,
}

impl AirtableStore {
    pub fn new(api_url: impl Into<String>, base_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            base_id: base_id.into(),
            token: token.into(),
        }
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| StoreError::Transport(format!("bad store url {}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport(format!("store url {} cannot be a base", self.api_url)))?
            .pop_if_empty()
            .push(&self.base_id)
            .push(table);
        Ok(url)
    }
}

/// Builds the case-insensitive exact-match formula for a Lead email.
pub fn email_formula(email: &str) -> String {
    let lowered = email.to_lowercase();
    let escaped = lowered.replace('\\', "\\\\").replace('"', "\\\"");
    format!("LOWER({{Email}})=\"{}\"", escaped)
}

async fn rejection(resp: reqwest::Response) -> StoreError {
    let status = resp.status().as_u16();
    let detail = resp.json::<Value>().await.unwrap_or_else(|_| json!({}));
    StoreError::Rejected { status, detail }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn find_lead_by_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        let url = self.table_url(LEADS_TABLE)?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("filterByFormula", email_formula(email).as_str()), ("maxRecords", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        let list: RecordList = resp.json().await?;
        Ok(list.records.into_iter().next().map(|r| r.id))
    }

    async fn create_record(&self, table: &str, fields: Fields) -> Result<Option<String>, StoreError> {
        let url = self.table_url(table)?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        tracing::debug!("Store insert into {} answered {}", table, resp.status());
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }

        // A 2xx means the record was written, whatever the body holds.
        match resp.json::<RecordRef>().await {
            Ok(created) => Ok(Some(created.id)),
            Err(e) => {
                tracing::warn!("Store insert into {} succeeded without a readable id: {}", table, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(String, Option<String>, HashMap<String, String>, Value)>>>,
    }

    async fn list(
        State(seen): State<Seen>,
        Path((_base, table)): Path<(String, String)>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.requests
            .lock()
            .unwrap()
            .push((table, auth, query.clone(), Value::Null));
        let formula = query.get("filterByFormula").cloned().unwrap_or_default();
        if formula.contains("ada@example.org") {
            Json(json!({ "records": [{ "id": "recLEAD1", "fields": {} }] }))
        } else {
            Json(json!({ "records": [] }))
        }
    }

    async fn create(
        State(seen): State<Seen>,
        Path((_base, table)): Path<(String, String)>,
        Json(body): Json<Value>,
    ) -> axum::response::Response {
        seen.requests
            .lock()
            .unwrap()
            .push((table.clone(), None, HashMap::new(), body));
        match table.as_str() {
            "AARs" => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": { "type": "INVALID_VALUE_FOR_COLUMN" } })),
            )
                .into_response(),
            "Broken" => (StatusCode::BAD_GATEWAY, "<html>oops</html>").into_response(),
            "Terse" => (StatusCode::OK, "OK").into_response(),
            _ => Json(json!({ "id": "recNEW", "fields": {} })).into_response(),
        }
    }

    async fn spawn_store() -> (String, Seen) {
        let seen = Seen::default();
        let app = Router::new()
            .route("/v0/:base/:table", get(list).post(create))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v0", addr), seen)
    }

    #[test]
    fn test_email_formula_lowercases_and_escapes() {
        assert_eq!(
            email_formula("Ada@Example.ORG"),
            r#"LOWER({Email})="ada@example.org""#
        );
        assert_eq!(
            email_formula(r#"a"b\c@x.io"#),
            r#"LOWER({Email})="a\"b\\c@x.io""#
        );
    }

    #[tokio::test]
    async fn test_lookup_finds_lead() {
        let (url, seen) = spawn_store().await;
        let store = AirtableStore::new(url, "appBASE", "patTOKEN");

        let found = store.find_lead_by_email("ADA@example.org").await.unwrap();
        assert_eq!(found.as_deref(), Some("recLEAD1"));

        let requests = seen.requests.lock().unwrap();
        let (table, auth, query, _) = &requests[0];
        assert_eq!(table, "Leads");
        assert_eq!(auth.as_deref(), Some("Bearer patTOKEN"));
        assert_eq!(query.get("maxRecords").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_lookup_without_match() {
        let (url, _seen) = spawn_store().await;
        let store = AirtableStore::new(url, "appBASE", "patTOKEN");

        let found = store.find_lead_by_email("nobody@example.org").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_create_posts_fields_to_encoded_table() {
        let (url, seen) = spawn_store().await;
        let store = AirtableStore::new(url, "appBASE", "patTOKEN");

        let mut fields = Fields::new();
        fields.insert("Email".to_string(), json!("ada@example.org"));
        let id = store.create_record("Quiz Results", fields).await.unwrap();
        assert_eq!(id.as_deref(), Some("recNEW"));

        let requests = seen.requests.lock().unwrap();
        let (table, _, _, body) = &requests[0];
        assert_eq!(table, "Quiz Results");
        assert_eq!(body["fields"]["Email"], "ada@example.org");
    }

    #[tokio::test]
    async fn test_create_rejected_carries_detail() {
        let (url, _seen) = spawn_store().await;
        let store = AirtableStore::new(url, "appBASE", "patTOKEN");

        let err = store.create_record("AARs", Fields::new()).await.unwrap_err();
        match err {
            StoreError::Rejected { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail["error"]["type"], "INVALID_VALUE_FOR_COLUMN");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_success_without_record_body() {
        let (url, seen) = spawn_store().await;
        let store = AirtableStore::new(url, "appBASE", "patTOKEN");

        let id = store.create_record("Terse", Fields::new()).await.unwrap();
        assert!(id.is_none());
        assert_eq!(seen.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejected_with_unreadable_body() {
        let (url, _seen) = spawn_store().await;
        let store = AirtableStore::new(url, "appBASE", "patTOKEN");

        let err = store.create_record("Broken", Fields::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 502, ref detail } if *detail == json!({})));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store = AirtableStore::new(format!("http://{}/v0", addr), "appBASE", "patTOKEN");
        let err = store.create_record("Leads", Fields::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}

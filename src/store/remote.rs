//! Implements the `Store` trait over the REST protocol of a Firebase-style realtime database.
//!
//! - `GET    {base}/{collection}.json` returns `null` or an object of `key -> record`
//! - `POST   {base}/{collection}.json` stores a record and returns `{"name": "<key>"}`
//! - `DELETE {base}/{collection}/{key}.json` removes a record

use crate::error::Res;
use crate::model::{Record, TransactionId};
use crate::store::Store;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use tracing::{trace, warn};
use url::Url;

/// A `Store` backed by a remote realtime database reached over HTTPS.
pub struct RemoteStore {
    client: reqwest::Client,
    base: Url,
    collection: String,
    auth_token: Option<String>,
}

impl Debug for RemoteStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("base", &self.base.as_str())
            .field("collection", &self.collection)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// The body returned by a successful `POST`.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl RemoteStore {
    /// Creates a store for `collection` under `base`. `timeout` bounds every HTTP request.
    pub fn new(
        base: Url,
        collection: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Res<Self> {
        let mut base = base;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let collection = collection.into().trim_matches('/').to_string();
        if collection.is_empty() {
            bail!("The collection path must not be empty");
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            base,
            collection,
            auth_token,
        })
    }

    /// The URL of the whole collection.
    fn collection_url(&self) -> Res<Url> {
        self.url(&format!("{}.json", self.collection))
    }

    /// The URL of the single record stored under `id`.
    fn document_url(&self, id: &TransactionId) -> Res<Url> {
        if id.as_str().is_empty() || id.as_str().contains(['/', '.', '#', '$', '[', ']']) {
            bail!("'{id}' is not a valid document key");
        }
        self.url(&format!("{}/{}.json", self.collection, id))
    }

    fn url(&self, path: &str) -> Res<Url> {
        let mut url = self
            .base
            .join(path)
            .with_context(|| format!("Unable to build a URL for '{path}'"))?;
        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Store for RemoteStore {
    async fn load_all(&self) -> Res<Vec<(TransactionId, Record)>> {
        let url = self.collection_url()?;
        trace!("GET {}", redact(&url));
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Unable to reach the remote store")?;
        let body = success_body(response).await?;
        parse_collection(&body)
    }

    async fn create(&self, record: &Record) -> Res<TransactionId> {
        let url = self.collection_url()?;
        trace!("POST {}", redact(&url));
        let response = self
            .client
            .post(url)
            .json(record)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Unable to send the new record to the remote store")?;
        let body = success_body(response).await?;
        let pushed: PushResponse = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected response to a create: {body}"))?;
        Ok(TransactionId::new(pushed.name))
    }

    async fn delete(&self, id: &TransactionId) -> Res<()> {
        let url = self.document_url(id)?;
        trace!("DELETE {}", redact(&url));
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Unable to send the delete to the remote store")?;
        let _ = success_body(response).await?;
        Ok(())
    }
}

/// Returns the response body, or an error carrying the status and body if the request failed.
async fn success_body(response: reqwest::Response) -> Res<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    if !status.is_success() {
        bail!("The remote store answered with status {status}: {body}");
    }
    Ok(body)
}

/// Parses the body of a collection read. Records that do not match the record shape are skipped.
fn parse_collection(body: &str) -> Res<Vec<(TransactionId, Record)>> {
    let documents: Option<BTreeMap<String, serde_json::Value>> =
        serde_json::from_str(body).context("The remote collection is not a JSON object")?;
    let mut records = Vec::new();
    for (key, value) in documents.unwrap_or_default() {
        match serde_json::from_value::<Record>(value) {
            Ok(record) => records.push((TransactionId::new(key), record)),
            Err(e) => warn!("Skipping stored document '{key}': {e}"),
        }
    }
    Ok(records)
}

/// The URL without its query string, so that the auth token is never logged. Errors from
/// `reqwest` carry the URL too, which is why they are stripped with `without_url` before they are
/// wrapped.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "s3cretTOKEN";

    fn store(base: &str, token: Option<&str>) -> RemoteStore {
        RemoteStore::new(
            Url::parse(base).unwrap(),
            "/users/me/transactions/",
            token.map(String::from),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    fn lunch() -> Record {
        Record {
            timestamp: 1760968800000,
            r#type: TransactionType::Expense,
            category: "Food".to_string(),
            description: "Lunch".to_string(),
            amount: Decimal::new(205, 1),
        }
    }

    /// Asserts that the full error chain says `expected` and does not leak the auth token.
    fn assert_error(result: Res<impl Debug>, expected: &str) {
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains(expected), "{message}");
        assert!(!message.contains(TOKEN), "{message}");
    }

    #[test]
    fn test_collection_url() {
        let store = store("https://example.firebaseio.com", None);
        assert_eq!(
            store.collection_url().unwrap().as_str(),
            "https://example.firebaseio.com/users/me/transactions.json"
        );
    }

    #[test]
    fn test_base_with_path_is_kept() {
        let store = store("https://example.com/db", Some("s3cret"));
        assert_eq!(
            store.collection_url().unwrap().as_str(),
            "https://example.com/db/users/me/transactions.json?auth=s3cret"
        );
    }

    #[test]
    fn test_document_url() {
        let store = store("https://example.firebaseio.com/", Some("t"));
        let url = store.document_url(&TransactionId::new("-NxA1")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.firebaseio.com/users/me/transactions/-NxA1.json?auth=t"
        );
        assert_eq!(
            redact(&url),
            "https://example.firebaseio.com/users/me/transactions/-NxA1.json"
        );
        assert!(store.document_url(&TransactionId::new("a/b")).is_err());
        assert!(store.document_url(&TransactionId::new("")).is_err());
    }

    #[test]
    fn test_empty_collection_is_rejected() {
        let result = RemoteStore::new(
            Url::parse("https://example.com").unwrap(),
            "/",
            None,
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_null_collection() {
        assert!(parse_collection("null").unwrap().is_empty());
    }

    #[test]
    fn test_parse_collection_skips_bad_documents() {
        let body = r#"{
            "-Nb": {"timestamp": 2, "type": "Expense", "category": "Food", "description": "Lunch", "amount": 20},
            "-Na": {"timestamp": 1, "type": "Income", "category": "Salary", "description": "", "amount": 1000.5},
            "-Nc": {"hello": "world"}
        }"#;
        let records = parse_collection(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0.as_str(), "-Na");
        assert_eq!(records[0].1.r#type, TransactionType::Income);
        assert_eq!(records[0].1.amount, Decimal::new(10005, 1));
        assert_eq!(records[1].0.as_str(), "-Nb");
    }

    #[test]
    fn test_parse_collection_rejects_non_objects() {
        assert!(parse_collection("[1, 2]").is_err());
        assert!(parse_collection("not json").is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = store("https://example.com", Some("s3cret"));
        let debug = format!("{store:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_load_all_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/transactions.json"))
            .and(query_param("auth", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "-Nb": {"timestamp": 2, "type": "Expense", "category": "Food", "description": "Lunch", "amount": 20.5},
                "-Na": {"timestamp": 1, "type": "Income", "category": "Salary", "description": "", "amount": 1000},
                "-Nc": "not a record"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let records = store(&server.uri(), Some(TOKEN)).load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0.as_str(), "-Na");
        assert_eq!(records[0].1.amount, Decimal::from(1000));
        assert_eq!(records[1].1.description, "Lunch");
    }

    #[tokio::test]
    async fn test_load_all_empty_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/transactions.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;
        let records = store(&server.uri(), None).load_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database is sleeping"))
            .mount(&server)
            .await;
        let result = store(&server.uri(), Some(TOKEN)).load_all().await;
        assert_error(result, "status 500 Internal Server Error: database is sleeping");
    }

    #[tokio::test]
    async fn test_create_returns_the_pushed_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/transactions.json"))
            .and(query_param("auth", TOKEN))
            .and(body_partial_json(json!({
                "timestamp": 1760968800000_i64,
                "type": "Expense",
                "category": "Food",
                "description": "Lunch",
                "amount": 20.5
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "-Nnew"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = store(&server.uri(), Some(TOKEN))
            .create(&lunch())
            .await
            .unwrap();
        assert_eq!(id.as_str(), "-Nnew");
    }

    #[tokio::test]
    async fn test_create_with_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id": 7}"#))
            .mount(&server)
            .await;
        let result = store(&server.uri(), Some(TOKEN)).create(&lunch()).await;
        assert_error(result, r#"Unexpected response to a create: {"id": 7}"#);
    }

    #[tokio::test]
    async fn test_create_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Permission denied"))
            .mount(&server)
            .await;
        let result = store(&server.uri(), Some(TOKEN)).create(&lunch()).await;
        assert_error(result, "status 401 Unauthorized: Permission denied");
    }

    #[tokio::test]
    async fn test_delete_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/me/transactions/-Nabc.json"))
            .and(query_param("auth", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .expect(1)
            .mount(&server)
            .await;
        store(&server.uri(), Some(TOKEN))
            .delete(&TransactionId::new("-Nabc"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .mount(&server)
            .await;
        let result = store(&server.uri(), Some(TOKEN))
            .delete(&TransactionId::new("-Nabc"))
            .await;
        assert_error(result, "status 503 Service Unavailable: try later");
    }

    #[tokio::test]
    async fn test_unreachable_store_does_not_leak_token() {
        let store = store("http://127.0.0.1:1", Some(TOKEN));
        assert_error(store.load_all().await, "Unable to reach the remote store");
        assert_error(
            store.create(&lunch()).await,
            "Unable to send the new record to the remote store",
        );
        assert_error(
            store.delete(&TransactionId::new("-Nabc")).await,
            "Unable to send the delete to the remote store",
        );
    }

    #[tokio::test]
    async fn test_slow_response_does_not_leak_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("null")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        let store = RemoteStore::new(
            Url::parse(&server.uri()).unwrap(),
            "transactions",
            Some(TOKEN.to_string()),
            Duration::from_millis(200),
        )
        .unwrap();
        assert_error(store.load_all().await, "Unable to reach the remote store");
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;

use super::{validate_key, RecordStore, StoreError};
use crate::record::{records_from_snapshot, sort_newest_first, SubmissionRecord};

const USER_AGENT: &str = concat!("subadmin/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct RealtimeDbOptions {
    pub database_url: String,
    pub collection: String,
    pub auth_token: Option<String>,
    pub timeout_seconds: usize,
    pub proxy: Option<String>,
}

impl Default for RealtimeDbOptions {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            collection: "users".to_string(),
            auth_token: None,
            timeout_seconds: 10,
            proxy: None,
        }
    }
}

/// Realtime database collection reached through its REST interface.
///
/// Paths map to `<database_url>/<collection>[/<id>].json` with every segment
/// percent-encoded; an access token, when set, is passed as the `auth` query
/// parameter.
#[derive(Clone, Debug)]
pub struct RealtimeDbStore {
    base_url: Url,
    collection: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl RealtimeDbStore {
    pub fn new(options: RealtimeDbOptions) -> Result<Self, StoreError> {
        let raw = options.database_url.trim().trim_end_matches('/');
        let base_url = Url::parse(raw).map_err(|e| StoreError::ClientSetup {
            reason: format!("invalid database url '{raw}': {e}"),
        })?;
        if base_url.scheme() != "https" && base_url.scheme() != "http" {
            return Err(StoreError::ClientSetup {
                reason: format!("database url must be http(s), got '{}'", base_url.scheme()),
            });
        }
        if base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(StoreError::ClientSetup {
                reason: format!("database url '{raw}' must not carry a query or fragment"),
            });
        }

        let collection = options.collection.trim().trim_matches('/').to_string();
        if collection.is_empty() {
            return Err(StoreError::ClientSetup {
                reason: "collection name is empty".to_string(),
            });
        }

        let client = build_client(options.proxy.as_deref(), options.timeout_seconds)?;
        let auth_token = options.auth_token.filter(|t| !t.trim().is_empty());

        Ok(Self {
            base_url,
            collection,
            auth_token,
            client,
        })
    }

    pub fn collection_url(&self) -> Url {
        self.url_for(&[format!("{}.json", self.collection).as_str()])
    }

    pub fn record_url(&self, id: &str) -> Url {
        self.url_for(&[self.collection.as_str(), format!("{id}.json").as_str()])
    }

    /// Appends each segment escaped, so `%`, `?` and spaces stay part of the key.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, path = url.path(), "store request");
        let req = self.client.request(method, url);
        match self.auth_token.as_deref() {
            Some(token) => req.query(&[("auth", token)]),
            None => req,
        }
    }

    async fn send_json(&self, req: RequestBuilder) -> Result<Value, StoreError> {
        let resp = req.send().await.map_err(|e| StoreError::Unavailable {
            reason: e.to_string(),
        })?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| StoreError::Unavailable {
            reason: format!("failed to read response body: {e}"),
        })?;
        if !status.is_success() {
            return Err(StoreError::Unavailable {
                reason: format!("server returned {}: {}", status, body.trim()),
            });
        }
        decode_body(&body)
    }
}

fn build_client(
    proxy: Option<&str>,
    timeout_seconds: usize,
) -> Result<reqwest::Client, StoreError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );

    let timeout = Duration::from_secs(timeout_seconds.try_into().unwrap_or(10));
    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout);

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| StoreError::ClientSetup {
            reason: format!("failed to setup proxy: {proxy}: {e}"),
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| StoreError::ClientSetup {
        reason: format!("failed to build HTTP client: {e}"),
    })
}

fn decode_body(body: &str) -> Result<Value, StoreError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|source| StoreError::MalformedSnapshot { source })
}

#[async_trait]
impl RecordStore for RealtimeDbStore {
    async fn fetch_all(&self) -> Result<Vec<SubmissionRecord>, StoreError> {
        let snapshot = self
            .send_json(self.request(Method::GET, self.collection_url()))
            .await?;
        let mut records = records_from_snapshot(&snapshot);
        sort_newest_first(&mut records);
        tracing::info!(count = records.len(), collection = %self.collection, "fetched submissions");
        Ok(records)
    }

    async fn delete_one(&self, id: &str) -> Result<(), StoreError> {
        validate_key(id)?;
        let url = self.record_url(id);

        let existing = self
            .send_json(self.request(Method::GET, url.clone()).query(&[("shallow", "true")]))
            .await?;
        if existing.is_null() {
            return Err(StoreError::NotFound { id: id.to_string() });
        }

        self.send_json(self.request(Method::DELETE, url)).await?;
        tracing::info!(id, collection = %self.collection, "deleted submission");
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.send_json(self.request(Method::DELETE, self.collection_url()))
            .await?;
        tracing::info!(collection = %self.collection, "cleared all submissions");
        Ok(())
    }
}

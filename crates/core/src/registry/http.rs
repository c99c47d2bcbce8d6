//! HTTP client for npm-compatible registries.
//!
//! Endpoints used:
//! - `GET /-/short` - array of every package name
//! - `GET /-/all/since?stale=update_after&startkey=<ms>` - change feed
//! - `GET /<name>` - package document (scoped names keep the leading `@`)

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::RegistryConfig;

use super::{ChangeFeed, RegistryClient, RegistryError};

/// Registry client backed by `reqwest`.
pub struct HttpRegistryClient {
    client: Client,
    base_url: String,
}

impl HttpRegistryClient {
    /// Create a new registry client.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .user_agent(format!("mirror-sync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn package_url(&self, name: &str) -> String {
        match name.strip_prefix('@') {
            Some(scoped) => format!("{}/@{}", self.base_url, urlencoding::encode(scoped)),
            None => format!("{}/{}", self.base_url, urlencoding::encode(name)),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn list_all(&self) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/-/short", self.base_url);
        debug!("Registry list all: {}", url);

        let response = Self::check_status(self.client.get(&url).send().await?).await?;

        response.json().await.map_err(|e| {
            RegistryError::ParseError(format!("Failed to parse package listing: {}", e))
        })
    }

    async fn changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Option<ChangeFeed>, RegistryError> {
        let url = format!("{}/-/all/since", self.base_url);
        let startkey = since.timestamp_millis().to_string();
        debug!("Registry changes since {} ({})", since, startkey);

        let response = self
            .client
            .get(&url)
            .query(&[("stale", "update_after"), ("startkey", startkey.as_str())])
            .send()
            .await?;
        let body = Self::check_status(response).await?.text().await?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<Option<ChangeFeed>>(&body).map_err(|e| {
            RegistryError::ParseError(format!("Failed to parse change feed: {}", e))
        })
    }

    async fn fetch_package(&self, name: &str) -> Result<Option<serde_json::Value>, RegistryError> {
        let url = self.package_url(name);
        debug!("Registry fetch package: {}", url);

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc = Self::check_status(response).await?.json().await.map_err(|e| {
            RegistryError::ParseError(format!("Failed to parse package {}: {}", name, e))
        })?;

        Ok(Some(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode as AxumStatus,
        routing::get,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Spawn a stub registry and return its base URL.
    async fn spawn_stub(since_body: &'static str) -> String {
        let app = Router::new()
            .route("/-/short", get(|| async { Json(json!(["a", "b", "@scope/c"])) }))
            .route(
                "/-/all/since",
                get(move |Query(params): Query<HashMap<String, String>>| async move {
                    assert_eq!(params.get("stale").map(String::as_str), Some("update_after"));
                    assert!(params.contains_key("startkey"));
                    since_body
                }),
            )
            .route(
                "/{name}",
                get(|Path(name): Path<String>| async move {
                    if name == "missing" {
                        Err(AxumStatus::NOT_FOUND)
                    } else if name == "broken" {
                        Err(AxumStatus::INTERNAL_SERVER_ERROR)
                    } else {
                        Ok(Json(json!({ "name": name })))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn client_for(url: String) -> HttpRegistryClient {
        HttpRegistryClient::new(&RegistryConfig {
            url,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client_for("https://registry.npmjs.org/".to_string());
        assert_eq!(client.base_url(), "https://registry.npmjs.org");
    }

    #[test]
    fn test_scoped_package_url() {
        let client = client_for("https://registry.npmjs.org".to_string());
        assert_eq!(
            client.package_url("@babel/core"),
            "https://registry.npmjs.org/@babel%2Fcore"
        );
        assert_eq!(
            client.package_url("lodash"),
            "https://registry.npmjs.org/lodash"
        );
    }

    #[tokio::test]
    async fn test_list_all() {
        let client = client_for(spawn_stub("").await);
        let names = client.list_all().await.unwrap();
        assert_eq!(names, vec!["a", "b", "@scope/c"]);
    }

    #[tokio::test]
    async fn test_changed_since_mapping() {
        let client = client_for(spawn_stub(r#"{"_updated": 1, "x": {}, "y": {}}"#).await);
        let feed = client.changed_since(Utc::now()).await.unwrap().unwrap();
        assert!(matches!(feed, ChangeFeed::Mapping(_)));
        assert_eq!(feed.len(), 2);
    }

    #[tokio::test]
    async fn test_changed_since_records() {
        let client = client_for(spawn_stub(r#"[{"name": "x"}, {"name": "y"}]"#).await);
        let feed = client.changed_since(Utc::now()).await.unwrap().unwrap();
        assert!(matches!(feed, ChangeFeed::Records(ref r) if r.len() == 2));
    }

    #[tokio::test]
    async fn test_changed_since_empty_and_null() {
        let client = client_for(spawn_stub("").await);
        assert!(client.changed_since(Utc::now()).await.unwrap().is_none());

        let client = client_for(spawn_stub("null").await);
        assert!(client.changed_since(Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_changed_since_garbage_is_parse_error() {
        let client = client_for(spawn_stub("not json").await);
        let err = client.changed_since(Utc::now()).await.unwrap_err();
        assert!(matches!(err, RegistryError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_fetch_package() {
        let client = client_for(spawn_stub("").await);

        let doc: Value = client.fetch_package("@scope/c").await.unwrap().unwrap();
        assert_eq!(doc["name"], "@scope/c");

        assert!(client.fetch_package("missing").await.unwrap().is_none());

        let err = client.fetch_package("broken").await.unwrap_err();
        assert!(matches!(err, RegistryError::ApiError { status: 500, .. }));
    }
}

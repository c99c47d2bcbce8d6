//! Upstream registry access.
//!
//! This module provides the `RegistryClient` trait used by the planner to list
//! and diff the upstream catalog, and by the package syncer to fetch package
//! documents, plus an HTTP implementation for npm-compatible registries.

mod http;
mod types;

pub use http::HttpRegistryClient;
pub use types::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to the upstream registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Registry returned an error status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Read-only access to an upstream package registry.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// List every package name known upstream, in registry order.
    async fn list_all(&self) -> Result<Vec<String>, RegistryError>;

    /// Packages whose metadata changed since `since`.
    ///
    /// `None` means the registry had nothing to report.
    async fn changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Option<ChangeFeed>, RegistryError>;

    /// Fetch a package document. `None` when the package does not exist upstream.
    async fn fetch_package(&self, name: &str) -> Result<Option<serde_json::Value>, RegistryError>;
}

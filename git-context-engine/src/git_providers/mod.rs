//! Provider facade without async-trait or dynamic trait objects.
//!
//! `ProviderClient` wraps the concrete provider implementation and exposes
//! the three calls the reviewer needs: diff fetch, review creation and
//! plain conversation comments.

pub mod types;
pub use types::*;

pub mod github;

use std::time::Duration;

use crate::errors::{GitContextEngineConfigError, GitContextEngineResult};
use tracing::debug;

/// Default GitHub REST base.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Runtime configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://api.github.com" or a GHES "https://host/api/v3".
    pub base_api: String,
    /// Access token (workflow token or PAT).
    pub token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Concrete provider client with enum dispatch.
#[derive(Debug, Clone)]
pub enum ProviderClient {
    GitHub(github::GitHubClient),
}

impl ProviderClient {
    /// Constructs a provider client from configuration.
    ///
    /// The HTTP client carries a stable user agent (GitHub rejects requests
    /// without one) and the configured timeout.
    pub fn from_config(cfg: ProviderConfig) -> GitContextEngineResult<Self> {
        debug!(
            "Initializing provider client: base_api={}, timeout_secs={}",
            cfg.base_api, cfg.timeout_secs
        );

        if cfg.token.trim().is_empty() {
            return Err(GitContextEngineConfigError::MissingToken.into());
        }
        let base = cfg.base_api.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(GitContextEngineConfigError::InvalidBaseUrl(cfg.base_api).into());
        }

        let client = reqwest::Client::builder()
            .user_agent("pr-review-agent/0.1")
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()?;

        Ok(ProviderClient::GitHub(github::GitHubClient::new(
            client,
            base.to_string(),
            cfg.token,
        )))
    }

    /// Fetches the unified diff of the pull request.
    pub async fn fetch_diff(&self, id: &ChangeRequestId) -> GitContextEngineResult<String> {
        match self {
            ProviderClient::GitHub(c) => c.fetch_diff(id).await,
        }
    }

    /// Creates a review (summary body plus line comments). Returns the review id.
    pub async fn create_review(
        &self,
        id: &ChangeRequestId,
        review: &ReviewDraft,
    ) -> GitContextEngineResult<u64> {
        match self {
            ProviderClient::GitHub(c) => c.create_review(id, review).await,
        }
    }

    /// Posts a single conversation comment. Returns the comment id.
    pub async fn create_issue_comment(
        &self,
        id: &ChangeRequestId,
        body: &str,
    ) -> GitContextEngineResult<u64> {
        match self {
            ProviderClient::GitHub(c) => c.create_issue_comment(id, body).await,
        }
    }
}

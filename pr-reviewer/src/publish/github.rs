//! GitHub pull request as both diff source and review publisher.

use git_context_engine::{
    ChangeRequestId, GitContextEngineError, ProviderClient, ProviderConfig, ReviewDraft,
};
use tracing::debug;

use super::ReviewPublisher;
use crate::errors::ReviewResult;
use crate::review::DiffSource;

/// One pull request bound to a provider client.
#[derive(Debug, Clone)]
pub struct GitHubPullRequest {
    client: ProviderClient,
    id: ChangeRequestId,
}

impl GitHubPullRequest {
    pub fn new(client: ProviderClient, id: ChangeRequestId) -> Self {
        Self { client, id }
    }

    /// Builds the provider client from config and binds it to `id`.
    pub fn connect(cfg: ProviderConfig, id: ChangeRequestId) -> ReviewResult<Self> {
        debug!(project = %id.project, iid = id.iid, "connecting to GitHub");
        let client = ProviderClient::from_config(cfg)?;
        Ok(Self::new(client, id))
    }

    pub fn id(&self) -> &ChangeRequestId {
        &self.id
    }
}

impl DiffSource for GitHubPullRequest {
    async fn fetch_diff(&self) -> Result<String, GitContextEngineError> {
        self.client.fetch_diff(&self.id).await
    }
}

impl ReviewPublisher for GitHubPullRequest {
    async fn post_review(&self, review: &ReviewDraft) -> Result<u64, GitContextEngineError> {
        self.client.create_review(&self.id, review).await
    }

    async fn post_comment(&self, body: &str) -> Result<u64, GitContextEngineError> {
        self.client.create_issue_comment(&self.id, body).await
    }
}

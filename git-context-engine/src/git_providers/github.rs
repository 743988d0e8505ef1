//! GitHub provider (REST v3) for PR diffs, reviews and comments.
//!
//! Endpoints used:
//!   * GET  /repos/{owner}/{repo}/pulls/{number}            (Accept: diff)
//!   * POST /repos/{owner}/{repo}/pulls/{number}/reviews
//!   * POST /repos/{owner}/{repo}/issues/{number}/comments

use crate::errors::{GitContextEngineError, GitContextEngineProviderError, GitContextEngineResult};
use crate::git_providers::types::*;
use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const ACCEPT_DIFF: &str = "application/vnd.github.v3.diff";
const ACCEPT_JSON: &str = "application/vnd.github+json";

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
    token: String,
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: String, token: String) -> Self {
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self {
            http,
            base_api: base_api.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Fetches the unified diff text of a pull request.
    ///
    /// Any non-2xx status is an error: without a diff there is nothing to review.
    pub async fn fetch_diff(&self, id: &ChangeRequestId) -> GitContextEngineResult<String> {
        let (owner, repo) = split_owner_repo(&id.project)?;
        let url = pulls_url(&self.base_api, &owner, &repo, id.iid);
        debug!("GitHub fetch_diff: {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT_DIFF)
            .send()
            .await?;

        let diff = check_status(resp).await?.text().await?;
        info!(
            project = %id.project,
            iid = id.iid,
            bytes = diff.len(),
            "pull request diff fetched"
        );
        Ok(diff)
    }

    /// Creates a review with line comments in a single request.
    ///
    /// GitHub rejects the whole review (422) if any comment is anchored to a
    /// line outside the diff; callers are expected to fall back to
    /// [`GitHubClient::create_issue_comment`].
    pub async fn create_review(
        &self,
        id: &ChangeRequestId,
        review: &ReviewDraft,
    ) -> GitContextEngineResult<u64> {
        let (owner, repo) = split_owner_repo(&id.project)?;
        let url = format!("{}/reviews", pulls_url(&self.base_api, &owner, &repo, id.iid));
        debug!(
            "GitHub create_review: url={}, comments={}",
            url,
            review.comments.len()
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT_JSON)
            .json(review)
            .send()
            .await?;

        let created: CreatedResource = check_status(resp).await?.json().await.map_err(|e| {
            GitContextEngineProviderError::InvalidResponse(format!("review response: {e}"))
        })?;

        info!(
            project = %id.project,
            iid = id.iid,
            review_id = created.id,
            comments = review.comments.len(),
            "review posted"
        );
        Ok(created.id)
    }

    /// Posts a single aggregate comment on the PR conversation.
    pub async fn create_issue_comment(
        &self,
        id: &ChangeRequestId,
        body: &str,
    ) -> GitContextEngineResult<u64> {
        if body.trim().is_empty() {
            return Err(GitContextEngineError::Validation(
                "comment body must not be empty".into(),
            ));
        }

        let (owner, repo) = split_owner_repo(&id.project)?;
        let url = issue_comments_url(&self.base_api, &owner, &repo, id.iid);
        debug!("GitHub create_issue_comment: url={}, len={}", url, body.len());

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT_JSON)
            .json(&IssueCommentCreate { body })
            .send()
            .await?;

        let created: CreatedResource = check_status(resp).await?.json().await.map_err(|e| {
            GitContextEngineProviderError::InvalidResponse(format!("comment response: {e}"))
        })?;

        info!(
            project = %id.project,
            iid = id.iid,
            comment_id = created.id,
            "issue comment posted"
        );
        Ok(created.id)
    }
}

/// Turns a non-2xx response into a classified provider error, keeping a
/// short body snippet and the `Retry-After` hint when present.
async fn check_status(resp: Response) -> GitContextEngineResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after_secs = resp
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let url = resp.url().to_string();
    let text = resp.text().await.unwrap_or_default();
    let detail: String = text.chars().take(300).collect();

    warn!(status = status.as_u16(), %url, %detail, "GitHub request failed");

    let err = match GitContextEngineProviderError::from_status(status.as_u16(), detail) {
        GitContextEngineProviderError::RateLimited { .. } => {
            GitContextEngineProviderError::RateLimited { retry_after_secs }
        }
        other => other,
    };
    Err(err.into())
}

/// Splits "owner/repo" into components or returns a validation error.
fn split_owner_repo(project: &str) -> GitContextEngineResult<(String, String)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitContextEngineError::Validation(format!(
            "invalid GitHub project id '{}', expected 'owner/repo'",
            project
        )));
    }

    Ok((owner.to_string(), repo.to_string()))
}

fn pulls_url(base: &str, owner: &str, repo: &str, number: u64) -> String {
    format!(
        "{}/repos/{}/{}/pulls/{}",
        base,
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        number
    )
}

fn issue_comments_url(base: &str, owner: &str, repo: &str, number: u64) -> String {
    format!(
        "{}/repos/{}/{}/issues/{}/comments",
        base,
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        number
    )
}

#[derive(Debug, Serialize)]
struct IssueCommentCreate<'a> {
    body: &'a str,
}

/// Subset shared by review and comment creation responses.
#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: u64,
}

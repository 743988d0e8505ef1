//! In-memory collaborators for unit tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use ai_llm_service::AiLlmError;
use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
use git_context_engine::{
    ChangeRequestId, GitContextEngineError, GitContextEngineProviderError, ReviewDraft,
};
use serde_json::Value;

use crate::agent::transcript::{ToolInvocationRequest, Turn};
use crate::agent::{ModelClient, ModelReply};
use crate::config::{ReviewMode, ReviewerConfig};
use crate::review::DiffSource;
use crate::tools::ToolDescriptor;

pub fn call(name: &str, args: Value) -> ModelReply {
    ModelReply::ToolCall(ToolInvocationRequest::from_json(name, args))
}

pub fn test_config(mode: ReviewMode, workspace: &Path) -> ReviewerConfig {
    ReviewerConfig {
        pull_request: ChangeRequestId {
            project: "octo/hello".into(),
            iid: 1,
        },
        github_token: "token".into(),
        github_api_url: "https://api.github.com".into(),
        github_timeout_secs: 30,
        mode,
        max_iterations: 5,
        workspace: workspace.to_path_buf(),
        dump_dir: None,
    }
}

fn script_exhausted() -> AiLlmError {
    ProviderError::new(
        Provider::Gemini,
        ProviderErrorKind::Decode("scripted model has no more replies".into()),
    )
    .into()
}

/// Replays a fixed list of replies; fails once the script runs out unless
/// a repeating reply is set.
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<ModelReply>>,
    repeat: Option<ModelReply>,
    texts: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<Turn>>>,
    completions: Mutex<Vec<(String, bool)>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn repeating(reply: ModelReply) -> Self {
        Self {
            repeat: Some(reply),
            ..Self::default()
        }
    }

    pub fn completing(texts: Vec<&str>) -> Self {
        Self {
            texts: Mutex::new(texts.into_iter().map(String::from).collect()),
            ..Self::default()
        }
    }

    /// Number of `respond` calls so far.
    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Transcript snapshots as received by each `respond` call.
    pub fn seen_transcripts(&self) -> Vec<Vec<Turn>> {
        self.seen.lock().unwrap().clone()
    }

    /// `(prompt, json_output)` per `complete` call.
    pub fn completions(&self) -> Vec<(String, bool)> {
        self.completions.lock().unwrap().clone()
    }
}

impl ModelClient for ScriptedModel {
    async fn respond(
        &self,
        transcript: &[Turn],
        _tools: &[ToolDescriptor],
    ) -> ai_llm_service::Result<ModelReply> {
        self.seen.lock().unwrap().push(transcript.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(script_exhausted)
    }

    async fn complete(&self, prompt: &str, json_output: bool) -> ai_llm_service::Result<String> {
        self.completions
            .lock()
            .unwrap()
            .push((prompt.to_string(), json_output));
        let next = self.texts.lock().unwrap().pop_front();
        next.ok_or_else(script_exhausted)
    }
}

/// Records everything posted; can be told to fail reviews and/or comments.
#[derive(Default)]
pub struct RecordingPublisher {
    reviews: Mutex<Vec<ReviewDraft>>,
    comments: Mutex<Vec<String>>,
    review_attempts: Mutex<usize>,
    fail_reviews: bool,
    fail_comments: bool,
}

impl RecordingPublisher {
    pub fn failing_reviews() -> Self {
        Self {
            fail_reviews: true,
            ..Self::default()
        }
    }

    pub fn failing_everything() -> Self {
        Self {
            fail_reviews: true,
            fail_comments: true,
            ..Self::default()
        }
    }

    pub fn reviews(&self) -> Vec<ReviewDraft> {
        self.reviews.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.comments.lock().unwrap().clone()
    }

    pub fn review_attempts(&self) -> usize {
        *self.review_attempts.lock().unwrap()
    }
}

impl crate::publish::ReviewPublisher for RecordingPublisher {
    async fn post_review(&self, review: &ReviewDraft) -> Result<u64, GitContextEngineError> {
        *self.review_attempts.lock().unwrap() += 1;
        if self.fail_reviews {
            return Err(GitContextEngineProviderError::Unprocessable(
                "line must be part of the diff".into(),
            )
            .into());
        }
        let mut reviews = self.reviews.lock().unwrap();
        reviews.push(review.clone());
        Ok(reviews.len() as u64)
    }

    async fn post_comment(&self, body: &str) -> Result<u64, GitContextEngineError> {
        if self.fail_comments {
            return Err(GitContextEngineProviderError::Forbidden.into());
        }
        let mut comments = self.comments.lock().unwrap();
        comments.push(body.to_string());
        Ok(comments.len() as u64)
    }
}

/// Fixed diff or a fixed failure.
pub struct StaticDiff(Option<String>);

impl StaticDiff {
    pub fn ok(diff: &str) -> Self {
        Self(Some(diff.to_string()))
    }

    pub fn not_found() -> Self {
        Self(None)
    }
}

impl DiffSource for StaticDiff {
    async fn fetch_diff(&self) -> Result<String, GitContextEngineError> {
        self.0
            .clone()
            .ok_or_else(|| GitContextEngineProviderError::NotFound.into())
    }
}

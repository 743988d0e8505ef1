//! Publishing the review back to the pull request.
//!
//! - Structured answers become one review with line comments.
//! - Anything that cannot be parsed, or a review the provider rejects, is
//!   posted as a single conversation comment instead.
//! - Only a failure of that fallback comment is reported as [`PublishError`].

pub mod github;
pub mod payload;

use git_context_engine::{
    CommentSide, GitContextEngineError, LineComment, ReviewDraft, ReviewEvent,
};
use tracing::{info, warn};

use crate::errors::PublishError;
use payload::ReviewPayload;

pub const REVIEW_HEADING: &str = "### 🤖 Gemini code review";
pub const FALLBACK_HEADING: &str = "### ⚠️ Line-level review could not be posted";
pub const EXHAUSTED_HEADING: &str = "### ⚠️ Gemini review could not complete";

/// Publishing collaborator.
#[allow(async_fn_in_trait)]
pub trait ReviewPublisher {
    /// Posts a review with line comments; returns the review id.
    async fn post_review(&self, review: &ReviewDraft) -> Result<u64, GitContextEngineError>;

    /// Posts one conversation comment; returns the comment id.
    async fn post_comment(&self, body: &str) -> Result<u64, GitContextEngineError>;
}

/// Which path a dispatch took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Line-level review posted.
    Structured { review_id: u64, comments: usize },
    /// Raw answer posted as a comment after a parse or publish failure.
    Fallback { comment_id: u64, reason: String },
    /// Free-form review posted as a comment.
    Comment { comment_id: u64 },
}

pub struct ResultDispatcher<'a, P> {
    publisher: &'a P,
}

impl<'a, P: ReviewPublisher> ResultDispatcher<'a, P> {
    pub fn new(publisher: &'a P) -> Self {
        Self { publisher }
    }

    /// Publishes a structured final answer, falling back to a raw comment.
    pub async fn dispatch(&self, answer: &str) -> Result<DispatchOutcome, PublishError> {
        let payload = match ReviewPayload::parse(answer) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, chars = answer.len(), "final answer is not a valid review payload");
                return self.fallback(answer, e.to_string()).await;
            }
        };

        let draft = to_draft(&payload);
        match self.publisher.post_review(&draft).await {
            Ok(review_id) => {
                info!(review_id, comments = draft.comments.len(), "structured review published");
                Ok(DispatchOutcome::Structured {
                    review_id,
                    comments: draft.comments.len(),
                })
            }
            Err(e) => {
                warn!(error = %e, comments = draft.comments.len(), "structured review rejected, falling back");
                self.fallback(answer, e.to_string()).await
            }
        }
    }

    /// Publishes free-form markdown as one comment.
    pub async fn dispatch_text(&self, text: &str) -> Result<DispatchOutcome, PublishError> {
        let body = format!("{REVIEW_HEADING}\n\n{}", text.trim());
        let comment_id = self.publisher.post_comment(&body).await?;
        info!(comment_id, chars = body.len(), "review comment published");
        Ok(DispatchOutcome::Comment { comment_id })
    }

    /// Posts a notice that the agent ran out of iterations.
    pub async fn notify_exhausted(&self, iterations: usize) -> Result<u64, PublishError> {
        let body = format!(
            "{EXHAUSTED_HEADING}\n\nThe review agent made {iterations} model calls without \
             producing a final answer, so no review was posted for this pull request."
        );
        Ok(self.publisher.post_comment(&body).await?)
    }

    async fn fallback(&self, raw: &str, reason: String) -> Result<DispatchOutcome, PublishError> {
        let body = format!("{FALLBACK_HEADING}\n\n{}", raw.trim());
        let comment_id = self.publisher.post_comment(&body).await?;
        info!(comment_id, %reason, "fallback comment published");
        Ok(DispatchOutcome::Fallback { comment_id, reason })
    }
}

/// Review with the summary as body and one right-side comment per item.
pub fn to_draft(payload: &ReviewPayload) -> ReviewDraft {
    let body = if payload.summary.trim().is_empty() {
        REVIEW_HEADING.to_string()
    } else {
        format!("{REVIEW_HEADING}\n\n{}", payload.summary)
    };
    ReviewDraft {
        body,
        event: ReviewEvent::Comment,
        comments: payload
            .reviews
            .iter()
            .map(|r| LineComment {
                path: r.path.clone(),
                line: r.line,
                side: CommentSide::Right,
                body: r.body.clone(),
            })
            .collect(),
    }
}

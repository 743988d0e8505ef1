//! Public entry for the pr-reviewer pipeline.
//!
//! One review session per process:
//!
//! 1) **Diff**: fetch the unified diff of the pull request.
//! 2) **Model step**: depends on [`ReviewMode`]:
//!    - `simple`: one free-form completion
//!    - `structured`: one JSON completion
//!    - `agentic`: bounded tool-calling loop over the checked-out workspace
//!      ([`agent::AgentLoop`] with `list_files` / `read_file`)
//! 3) **Publish**: a line-level review, or a single comment when the answer
//!    cannot be used as a review.
//!
//! Collaborators (diff source, model, publisher) are traits used through
//! generics with plain `async fn`; no `async-trait`, no boxed futures.

pub mod agent;
pub mod config;
pub mod errors;
pub mod publish;
pub mod review;
pub mod telemetry;
pub mod tools;

#[cfg(test)]
mod testkit;

pub use agent::{GeminiModel, ModelClient, ModelReply};
pub use config::{ReviewMode, ReviewerConfig};
pub use errors::{ConfigError, PublishError, ReviewError, ReviewResult};
pub use publish::github::GitHubPullRequest;
pub use publish::{DispatchOutcome, ResultDispatcher, ReviewPublisher};
pub use review::{DiffSource, ReviewOutcome, run_review};
pub use tools::ToolRegistry;

/// Log target prefix of this crate.
pub const TARGET_PREFIX: &str = "pr_reviewer";

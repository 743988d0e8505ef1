//! Crate-wide error hierarchy for pr-reviewer.
//!
//! - Single root [`ReviewError`] for session-level failures.
//! - Tool failures are *not* session errors: they are rendered into the
//!   transcript as error results (see [`crate::tools::ToolError`]).
//! - Publishing has its own [`PublishError`], raised only when the
//!   aggregate-comment fallback itself fails.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use git_context_engine::GitContextEngineError;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Root error type for the pr-reviewer crate.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Startup configuration problems (missing/invalid env, duplicate tools).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Workspace root for filesystem tools is unusable.
    #[error("workspace {path} is not usable: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pull-request diff could not be fetched; nothing to review.
    #[error("failed to fetch pull request diff: {0}")]
    DiffFetch(#[source] GitContextEngineError),

    /// Model collaborator failure (config, HTTP, decode).
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    /// Provider client setup failure.
    #[error(transparent)]
    Provider(#[from] GitContextEngineError),

    /// Both the structured publish and its fallback failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing or unparsable environment variable.
    #[error(transparent)]
    Env(#[from] ai_llm_service::error_handler::ConfigError),

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    /// A tool name was registered twice.
    #[error("tool `{0}` is already registered")]
    DuplicateTool(String),
}

/// Raised when nothing could be published to the pull request.
#[derive(Debug, Error)]
#[error("publishing to the pull request failed: {source}")]
pub struct PublishError {
    #[from]
    source: GitContextEngineError,
}

impl PublishError {
    pub fn provider_error(&self) -> &GitContextEngineError {
        &self.source
    }
}

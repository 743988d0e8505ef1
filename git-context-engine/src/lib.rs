//! Pull-request I/O against the Git provider.
//!
//! The reviewer reads one thing (the unified diff) and writes two things
//! (a review with line comments, or a single conversation comment).

pub mod errors;
pub mod git_providers;

pub use errors::{
    GitContextEngineConfigError, GitContextEngineError, GitContextEngineProviderError,
    GitContextEngineResult,
};
pub use git_providers::{
    ChangeRequestId, CommentSide, DEFAULT_GITHUB_API, LineComment, ProviderClient, ProviderConfig,
    ReviewDraft, ReviewEvent,
};

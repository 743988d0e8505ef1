//! Provider-agnostic data model for pull requests and review payloads.

use serde::{Deserialize, Serialize};

/// A unique reference to a pull request inside a provider.
///
/// * `project` – GitHub: "owner/repo".
/// * `iid`     – PR number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequestId {
    pub project: String,
    pub iid: u64,
}

/// The side of the diff where a line comment is attached.
///
/// Reviews are produced from the head checkout, so comments anchor on
/// GitHub's "RIGHT" (head) side only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommentSide {
    Right,
}

/// One line-anchored comment inside a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineComment {
    /// Path of the file in the repository (new path if renamed).
    pub path: String,
    /// 1-based line number in the file version selected by `side`.
    pub line: u32,
    pub side: CommentSide,
    pub body: String,
}

/// Review verdict sent with a review. The reviewer only ever comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Comment,
}

/// A review with a top-level body and any number of line comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub body: String,
    pub event: ReviewEvent,
    pub comments: Vec<LineComment>,
}

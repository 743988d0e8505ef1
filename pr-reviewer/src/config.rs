//! Reviewer configuration loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `REPO_NAME`             = "owner/repo" (mandatory)
//! - `PR_NUMBER`             = pull request number (mandatory)
//! - `GITHUB_TOKEN`          = token used for all GitHub calls (mandatory)
//! - `GITHUB_API_URL`        = REST base (default `https://api.github.com`)
//! - `GITHUB_TIMEOUT_SECS`   = per-request timeout (default 30)
//! - `REVIEW_MODE`           = `simple` | `structured` | `agentic` (default `agentic`)
//! - `REVIEW_MAX_ITERATIONS` = agent iteration cap, >= 1 (default 5)
//! - `REVIEW_WORKSPACE`      = checkout root for file tools (default `.`)
//! - `REVIEW_DUMP_DIR`       = when set, the agent transcript is written there
//!
//! Gemini settings (`GEMINI_API_KEY`, `GEMINI_MODEL`, ...) are read by
//! `ai_llm_service::config::default_config`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use ai_llm_service::error_handler::{must_lookup, parse_opt};
use git_context_engine::{ChangeRequestId, DEFAULT_GITHUB_API, ProviderConfig};
use serde::Serialize;

use crate::agent::agent_loop::DEFAULT_MAX_ITERATIONS;
use crate::errors::{ConfigError, ReviewResult};

pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 30;

/// Review variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    /// One model call, free-form markdown, one aggregate comment.
    Simple,
    /// One model call in JSON mode, line-level review.
    Structured,
    /// Tool-calling agent loop, line-level review.
    #[default]
    Agentic,
}

impl FromStr for ReviewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ReviewMode::Simple),
            "structured" => Ok(ReviewMode::Structured),
            "agentic" | "agent" => Ok(ReviewMode::Agentic),
            other => Err(format!(
                "unknown mode `{other}`, expected simple, structured or agentic"
            )),
        }
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewMode::Simple => "simple",
            ReviewMode::Structured => "structured",
            ReviewMode::Agentic => "agentic",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReviewerConfig {
    pub pull_request: ChangeRequestId,
    pub github_token: String,
    pub github_api_url: String,
    pub github_timeout_secs: u64,
    pub mode: ReviewMode,
    pub max_iterations: usize,
    pub workspace: PathBuf,
    pub dump_dir: Option<PathBuf>,
}

impl ReviewerConfig {
    pub fn from_env() -> ReviewResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`ReviewerConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ReviewResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self::parse(&lookup)?)
    }

    fn parse<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let repo = must_lookup("REPO_NAME", lookup)?;
        let valid_repo = repo
            .split_once('/')
            .is_some_and(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'));
        if !valid_repo {
            return Err(invalid("REPO_NAME", "expected `owner/repo`"));
        }

        let pr_number = must_lookup("PR_NUMBER", lookup)?
            .parse::<u64>()
            .map_err(|_| invalid("PR_NUMBER", "expected a pull request number"))?;

        let github_token = must_lookup("GITHUB_TOKEN", lookup)?;

        let github_api_url =
            opt("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API.to_string());
        if !(github_api_url.starts_with("http://") || github_api_url.starts_with("https://")) {
            return Err(invalid("GITHUB_API_URL", "must start with http:// or https://"));
        }

        let github_timeout_secs = parse_opt::<u64>(
            "GITHUB_TIMEOUT_SECS",
            lookup("GITHUB_TIMEOUT_SECS"),
            "expected u64",
        )?
        .unwrap_or(DEFAULT_GITHUB_TIMEOUT_SECS);

        let mode = match opt("REVIEW_MODE") {
            Some(raw) => raw
                .parse::<ReviewMode>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: "REVIEW_MODE",
                    reason,
                })?,
            None => ReviewMode::default(),
        };

        let max_iterations = parse_opt::<usize>(
            "REVIEW_MAX_ITERATIONS",
            lookup("REVIEW_MAX_ITERATIONS"),
            "expected a positive integer",
        )?
        .unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(invalid("REVIEW_MAX_ITERATIONS", "must be at least 1"));
        }

        let workspace = opt("REVIEW_WORKSPACE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let dump_dir = opt("REVIEW_DUMP_DIR").map(PathBuf::from);

        Ok(Self {
            pull_request: ChangeRequestId {
                project: repo,
                iid: pr_number,
            },
            github_token,
            github_api_url,
            github_timeout_secs,
            mode,
            max_iterations,
            workspace,
            dump_dir,
        })
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_api: self.github_api_url.clone(),
            token: self.github_token.clone(),
            timeout_secs: self.github_timeout_secs,
        }
    }
}

fn invalid(var: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        reason: reason.to_string(),
    }
}

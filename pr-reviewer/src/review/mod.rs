//! Review session: diff → prompt → mode-specific model step → publish.

pub mod prompt;

use std::time::Instant;

use git_context_engine::GitContextEngineError;
use tracing::{error, info, warn};

use crate::agent::{AgentError, AgentLoop, ModelClient};
use crate::config::{ReviewMode, ReviewerConfig};
use crate::errors::{ReviewError, ReviewResult};
use crate::publish::{DispatchOutcome, ResultDispatcher, ReviewPublisher};
use crate::telemetry::transcript_dump;
use crate::tools::ToolRegistry;

/// Source of the pull-request diff.
#[allow(async_fn_in_trait)]
pub trait DiffSource {
    async fn fetch_diff(&self) -> Result<String, GitContextEngineError>;
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// Empty diff; nothing was posted.
    NothingToReview,
    /// A review or comment was posted.
    Published(DispatchOutcome),
    /// The agent hit its iteration cap; a notice comment was posted.
    Exhausted { iterations: usize },
}

/// Runs one review session for the configured pull request.
///
/// # Errors
/// - [`ReviewError::DiffFetch`] if the diff cannot be fetched
/// - [`ReviewError::Llm`] if a model call fails
/// - [`ReviewError::Workspace`] if the tool workspace is unusable (agentic)
/// - [`ReviewError::Publish`] if nothing could be posted
pub async fn run_review<D, M, P>(
    config: &ReviewerConfig,
    diff_source: &D,
    model: &M,
    publisher: &P,
) -> ReviewResult<ReviewOutcome>
where
    D: DiffSource,
    M: ModelClient,
    P: ReviewPublisher,
{
    let t0 = Instant::now();
    info!(
        project = %config.pull_request.project,
        iid = config.pull_request.iid,
        mode = %config.mode,
        "review: session started"
    );

    let diff = diff_source.fetch_diff().await.map_err(|e| {
        error!(error = %e, "review: diff fetch failed");
        ReviewError::DiffFetch(e)
    })?;

    if diff.trim().is_empty() {
        warn!("review: pull request diff is empty, nothing to review");
        return Ok(ReviewOutcome::NothingToReview);
    }
    info!(diff_bytes = diff.len(), "review: diff fetched");

    let dispatcher = ResultDispatcher::new(publisher);

    let outcome = match config.mode {
        ReviewMode::Simple => {
            let text = model.complete(&prompt::simple_prompt(&diff), false).await?;
            ReviewOutcome::Published(dispatcher.dispatch_text(&text).await?)
        }
        ReviewMode::Structured => {
            let text = model
                .complete(&prompt::structured_prompt(&diff), true)
                .await?;
            ReviewOutcome::Published(dispatcher.dispatch(&text).await?)
        }
        ReviewMode::Agentic => {
            let registry = ToolRegistry::with_workspace_tools(&config.workspace)?;
            let run = AgentLoop::new(model, &registry)
                .run(&prompt::agentic_prompt(&diff), config.max_iterations)
                .await;

            if let Some(dir) = &config.dump_dir {
                match transcript_dump::dump_run(dir, &run) {
                    Ok(path) => info!(path = %path.display(), "review: transcript dumped"),
                    Err(e) => warn!(error = %e, "review: transcript dump failed"),
                }
            }

            match run.outcome {
                Ok(answer) => ReviewOutcome::Published(dispatcher.dispatch(answer.text()).await?),
                Err(AgentError::Exhausted { iterations }) => {
                    let comment_id = dispatcher.notify_exhausted(iterations).await?;
                    warn!(iterations, comment_id, "review: agent exhausted, notice posted");
                    ReviewOutcome::Exhausted { iterations }
                }
                Err(AgentError::Model(e)) => return Err(ReviewError::Llm(e)),
            }
        }
    };

    info!(
        ?outcome,
        elapsed_ms = t0.elapsed().as_millis(),
        "review: session finished"
    );
    Ok(outcome)
}

use std::process::ExitCode;

use ai_llm_service::GeminiService;
use ai_llm_service::config::default_config::config_gemini;
use pr_reviewer::{
    GeminiModel, GitHubPullRequest, ReviewError, ReviewOutcome, ReviewerConfig, run_review,
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_TARGETS: &[&str] = &[
    "pr_review_agent",
    pr_reviewer::TARGET_PREFIX,
    ai_llm_service::telemetry::TARGET_PREFIX,
    "git_context_engine",
];

/// Exit status when the agent loop ran out of iterations.
const EXIT_EXHAUSTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Optional: CI passes everything through the environment.
    let dotenv = dotenvy::dotenv().ok();

    let filter = ai_llm_service::telemetry::env_filter_with_level(
        "warn",
        LOG_TARGETS,
        tracing::Level::INFO,
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(ai_llm_service::telemetry::layer_for(LOG_TARGETS))
        .init();

    if let Some(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    match run().await {
        Ok(ReviewOutcome::Exhausted { iterations }) => {
            error!(iterations, "review did not complete: iteration cap reached");
            ExitCode::from(EXIT_EXHAUSTED)
        }
        Ok(outcome) => {
            info!(?outcome, "review finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "review failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ReviewOutcome, ReviewError> {
    let config = ReviewerConfig::from_env()?;
    let model = GeminiModel::new(GeminiService::new(config_gemini()?)?);
    let pull_request =
        GitHubPullRequest::connect(config.provider_config(), config.pull_request.clone())?;

    info!(
        project = %config.pull_request.project,
        iid = config.pull_request.iid,
        mode = %config.mode,
        model = %model.model_name(),
        max_iterations = config.max_iterations,
        "starting review"
    );

    run_review(&config, &pull_request, &model, &pull_request).await
}

//! Core agent loop: model ↔ local tools, bounded by an iteration cap.
//!
//! One iteration is one model call, followed by at most one tool execution.
//! Tool failures are fed back to the model as error results; only a failing
//! model call ends the run early.

use ai_llm_service::AiLlmError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::prompt::seed_prompt;
use super::transcript::{Transcript, Turn};
use super::{ModelClient, ModelReply};
use crate::tools::ToolRegistry;

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Where the loop is (or stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    AwaitingModel,
    ExecutingTool,
    /// Terminal: final answer received.
    Done,
    /// Terminal: cap reached without a final answer.
    Exhausted,
    /// Terminal: the model call itself failed.
    Failed,
}

/// Terminal model text. Its shape is checked later by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalAnswer(pub String);

impl FinalAnswer {
    pub fn text(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent loop exhausted after {iterations} iterations without a final answer")]
    Exhausted { iterations: usize },

    #[error("model call failed: {0}")]
    Model(#[from] AiLlmError),
}

/// Everything a run produced, whatever the outcome.
#[derive(Debug)]
pub struct AgentRun {
    pub transcript: Transcript,
    /// Model calls attempted.
    pub iterations: usize,
    pub state: LoopState,
    pub outcome: Result<FinalAnswer, AgentError>,
}

impl AgentRun {
    pub fn into_result(self) -> Result<FinalAnswer, AgentError> {
        self.outcome
    }
}

/// Drives one review conversation. Holds no state between runs; each
/// [`AgentLoop::run`] owns a fresh transcript.
pub struct AgentLoop<'a, M> {
    model: &'a M,
    registry: &'a ToolRegistry,
}

impl<'a, M: ModelClient> AgentLoop<'a, M> {
    pub fn new(model: &'a M, registry: &'a ToolRegistry) -> Self {
        Self { model, registry }
    }

    /// Runs until a final answer or `max_iterations` model calls.
    ///
    /// With `max_iterations == 0` no model call is made and the run is
    /// immediately exhausted.
    pub async fn run(&self, initial_prompt: &str, max_iterations: usize) -> AgentRun {
        let tools = self.registry.describe();
        let mut transcript = Transcript::new();
        transcript.append(Turn::requester(seed_prompt(initial_prompt, tools)));

        info!(
            max_iterations,
            tools = tools.len(),
            prompt_chars = initial_prompt.len(),
            "agent: run started"
        );

        let mut state = LoopState::AwaitingModel;
        for iteration in 1..=max_iterations {
            debug!(iteration, turns = transcript.snapshot().len(), ?state, "agent: calling model");

            let reply = match self.model.respond(transcript.snapshot(), tools).await {
                Ok(r) => r,
                Err(e) => {
                    error!(iteration, error = %e, "agent: model call failed");
                    return AgentRun {
                        transcript,
                        iterations: iteration,
                        state: LoopState::Failed,
                        outcome: Err(AgentError::Model(e)),
                    };
                }
            };

            match reply {
                ModelReply::FinalAnswer(text) => {
                    transcript.append(Turn::model_text(text.clone()));
                    info!(
                        iteration,
                        turns = transcript.snapshot().len(),
                        answer_chars = text.len(),
                        "agent: final answer"
                    );
                    return AgentRun {
                        transcript,
                        iterations: iteration,
                        state: LoopState::Done,
                        outcome: Ok(FinalAnswer(text)),
                    };
                }
                ModelReply::ToolCall(request) => {
                    transcript.append(Turn::model_call(request.clone()));
                    state = LoopState::ExecutingTool;
                    info!(
                        iteration,
                        ?state,
                        tool = %request.name,
                        args = ?request.arguments,
                        "agent: tool requested"
                    );

                    let result = self.registry.invoke(&request);
                    debug!(
                        iteration,
                        tool = %result.name,
                        is_error = result.is_error,
                        output_chars = result.output.len(),
                        "agent: tool finished"
                    );

                    transcript.append(Turn::tool_result(result));
                    state = LoopState::AwaitingModel;
                }
            }
        }

        warn!(
            max_iterations,
            turns = transcript.snapshot().len(),
            ?state,
            "agent: iteration cap reached without a final answer"
        );
        AgentRun {
            transcript,
            iterations: max_iterations,
            state: LoopState::Exhausted,
            outcome: Err(AgentError::Exhausted {
                iterations: max_iterations,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::transcript::{Role, ToolInvocationRequest, TurnContent};
    use crate::testkit::{ScriptedModel, call};
    use crate::tools::ToolRegistry;
    use serde_json::json;
    use std::fs;

    fn workspace() -> (tempfile::TempDir, ToolRegistry) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("A.java"), "class A {\n  void f() {}\n}\n").unwrap();
        let reg = ToolRegistry::with_workspace_tools(dir.path()).unwrap();
        (dir, reg)
    }

    #[tokio::test]
    async fn first_final_answer_ends_in_one_iteration() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![ModelReply::FinalAnswer("{}".into())]);

        let run = AgentLoop::new(&model, &reg).run("review", 5).await;

        assert_eq!(run.iterations, 1);
        assert_eq!(run.state, LoopState::Done);
        assert_eq!(run.transcript.snapshot().len(), 2);
        assert_eq!(model.calls(), 1);
        assert_eq!(run.into_result().unwrap(), FinalAnswer("{}".into()));
    }

    #[tokio::test]
    async fn tool_calls_every_time_exhaust_exactly_at_cap() {
        let (_dir, reg) = workspace();
        for cap in [1usize, 3, 5] {
            let model = ScriptedModel::repeating(call("list_files", json!({})));
            let run = AgentLoop::new(&model, &reg).run("review", cap).await;

            assert_eq!(model.calls(), cap);
            assert_eq!(run.iterations, cap);
            assert_eq!(run.state, LoopState::Exhausted);
            assert_eq!(run.transcript.snapshot().len(), 1 + 2 * cap);
            assert!(matches!(
                run.outcome,
                Err(AgentError::Exhausted { iterations }) if iterations == cap
            ));
        }
    }

    #[tokio::test]
    async fn zero_cap_never_calls_the_model() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![ModelReply::FinalAnswer("x".into())]);
        let run = AgentLoop::new(&model, &reg).run("review", 0).await;
        assert_eq!(model.calls(), 0);
        assert_eq!(run.transcript.snapshot().len(), 1);
        assert!(matches!(run.outcome, Err(AgentError::Exhausted { iterations: 0 })));
    }

    #[tokio::test]
    async fn each_tool_call_gets_one_result_before_next_model_call() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![
            call("read_file", json!({"path": "A.java"})),
            call("list_files", json!({"directory": "."})),
            ModelReply::FinalAnswer("done".into()),
        ]);

        let run = AgentLoop::new(&model, &reg).run("review", 5).await;
        assert_eq!(run.state, LoopState::Done);

        let seen = model.seen_transcripts();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].len(), 1);
        for pair in seen.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            assert_eq!(after.len(), before.len() + 2);
            let call_turn = &after[after.len() - 2];
            let result_turn = &after[after.len() - 1];
            assert_eq!(call_turn.role, Role::Model);
            assert!(matches!(call_turn.content, TurnContent::ToolCall(_)));
            assert_eq!(result_turn.role, Role::ToolResult);
        }
    }

    #[tokio::test]
    async fn unknown_tool_does_not_abort() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![
            call("delete_repo", json!({})),
            ModelReply::FinalAnswer("ok".into()),
        ]);

        let run = AgentLoop::new(&model, &reg).run("review", 5).await;

        assert_eq!(run.state, LoopState::Done);
        assert_eq!(run.iterations, 2);
        match &run.transcript.snapshot()[2].content {
            TurnContent::ToolResult(r) => {
                assert!(r.is_error);
                assert!(r.output.contains("unknown tool"));
            }
            other => panic!("expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_tool_is_recoverable() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![
            call("read_file", json!({"path": "../../etc/passwd"})),
            call("read_file", json!({})),
            ModelReply::FinalAnswer("ok".into()),
        ]);

        let run = AgentLoop::new(&model, &reg).run("review", 5).await;
        assert_eq!(run.state, LoopState::Done);
        let errors = run
            .transcript
            .snapshot()
            .iter()
            .filter(|t| matches!(&t.content, TurnContent::ToolResult(r) if r.is_error))
            .count();
        assert_eq!(errors, 2);
    }

    #[tokio::test]
    async fn model_failure_keeps_transcript() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![call("list_files", json!({}))]);

        let run = AgentLoop::new(&model, &reg).run("review", 5).await;

        assert_eq!(run.state, LoopState::Failed);
        assert_eq!(run.iterations, 2);
        assert_eq!(run.transcript.snapshot().len(), 3);
        assert!(matches!(run.outcome, Err(AgentError::Model(_))));
    }

    #[tokio::test]
    async fn transcript_length_matches_turn_accounting() {
        let (_dir, reg) = workspace();
        let script = vec![
            call("list_files", json!({})),
            call("read_file", json!({"path": "A.java"})),
            call("list_files", json!({"depth": 2})),
            ModelReply::FinalAnswer("{}".into()),
        ];
        let tool_calls = script
            .iter()
            .filter(|r| matches!(r, ModelReply::ToolCall(_)))
            .count();
        let model = ScriptedModel::new(script);

        let run = AgentLoop::new(&model, &reg).run("review", 10).await;
        assert_eq!(run.transcript.snapshot().len(), 1 + run.iterations + tool_calls);
    }

    #[tokio::test]
    async fn example_session_builds_six_turns() {
        let (_dir, reg) = workspace();
        let model = ScriptedModel::new(vec![
            call("list_files", json!({"directory": "."})),
            call("read_file", json!({"path": "A.java"})),
            ModelReply::FinalAnswer(
                r#"{"summary":"ok","reviews":[{"path":"A.java","line":10,"body":"fix null check"}]}"#
                    .into(),
            ),
        ]);

        let run = AgentLoop::new(&model, &reg).run("review the diff", 5).await;
        let turns = run.transcript.snapshot();

        assert_eq!(turns.len(), 6);
        let roles: Vec<_> = turns.iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            [
                Role::Requester,
                Role::Model,
                Role::ToolResult,
                Role::Model,
                Role::ToolResult,
                Role::Model
            ]
        );
        match &turns[2].content {
            TurnContent::ToolResult(r) => assert_eq!(r.output, "[FILE] A.java"),
            other => panic!("unexpected {other:?}"),
        }
        match &turns[4].content {
            TurnContent::ToolResult(r) => assert!(r.output.starts_with("class A")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            &turns[1].content,
            TurnContent::ToolCall(ToolInvocationRequest { name, .. }) if name == "list_files"
        ));
    }
}

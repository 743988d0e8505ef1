//! [`ModelClient`] over the Gemini `generateContent` API.
//!
//! Transcript turns map onto Gemini contents:
//! - requester text → role `user`, text part
//! - model text → role `model`, text part
//! - model tool call → role `model`, `functionCall` part
//! - tool result → role `function`, `functionResponse {name, response:{name, content}}`

use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
use ai_llm_service::{
    AiLlmError, Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiService,
    GenerateOptions, Part,
};
use serde_json::json;
use tracing::warn;

use super::transcript::{Role, ToolInvocationRequest, Turn, TurnContent};
use super::{ModelClient, ModelReply};
use crate::tools::ToolDescriptor;

pub struct GeminiModel {
    service: GeminiService,
}

impl GeminiModel {
    pub fn new(service: GeminiService) -> Self {
        Self { service }
    }

    pub fn model_name(&self) -> &str {
        self.service.model()
    }
}

impl ModelClient for GeminiModel {
    async fn respond(
        &self,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
    ) -> ai_llm_service::Result<ModelReply> {
        let contents = to_contents(transcript);
        let functions = to_declarations(tools);
        // JSON output mode is only requested when no functions are declared;
        // the API rejects the combination.
        let options = GenerateOptions {
            json_output: functions.is_empty(),
        };
        let content = self
            .service
            .generate_content(&contents, &functions, options)
            .await?;
        decode_reply(content)
    }

    async fn complete(&self, prompt: &str, json_output: bool) -> ai_llm_service::Result<String> {
        self.service.generate(prompt, json_output).await
    }
}

pub fn to_contents(transcript: &[Turn]) -> Vec<Content> {
    transcript.iter().map(to_content).collect()
}

fn to_content(turn: &Turn) -> Content {
    let role = match turn.role {
        Role::Requester => "user",
        Role::Model => "model",
        Role::ToolResult => "function",
    };
    let part = match &turn.content {
        TurnContent::Text { text } => Part::text(text.clone()),
        TurnContent::ToolCall(req) => Part::function_call(FunctionCall {
            name: req.name.clone(),
            args: req.arguments.clone(),
        }),
        TurnContent::ToolResult(res) => Part::function_response(FunctionResponse {
            name: res.name.clone(),
            response: json!({ "name": res.name, "content": res.output }),
        }),
    };
    Content {
        role: Some(role.to_string()),
        parts: vec![part],
    }
}

pub fn to_declarations(tools: &[ToolDescriptor]) -> Vec<FunctionDeclaration> {
    tools
        .iter()
        .map(|t| FunctionDeclaration {
            name: t.name.clone(),
            description: t.description.clone(),
            parameters: t.parameters_schema(),
        })
        .collect()
}

/// Function call wins over text. Only the first call is executed; extra
/// calls in the same candidate are logged and dropped.
pub fn decode_reply(content: Content) -> ai_llm_service::Result<ModelReply> {
    let calls: Vec<&FunctionCall> = content
        .parts
        .iter()
        .filter_map(|p| p.function_call.as_ref())
        .collect();

    if let Some(first) = calls.first() {
        if calls.len() > 1 {
            warn!(
                requested = calls.len(),
                executed = %first.name,
                "model requested several tools at once; executing the first only"
            );
        }
        return Ok(ModelReply::ToolCall(ToolInvocationRequest::from_json(
            first.name.clone(),
            first.args.clone(),
        )));
    }

    match content.text() {
        Some(text) => Ok(ModelReply::FinalAnswer(text)),
        None => Err(AiLlmError::from(ProviderError::new(
            Provider::Gemini,
            ProviderErrorKind::Decode("candidate has neither a function call nor text".into()),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::transcript::ToolResult;
    use crate::tools::fs::{list_files_descriptor, read_file_descriptor};

    #[test]
    fn transcript_maps_to_gemini_contents() {
        let turns = vec![
            Turn::requester("diff"),
            Turn::model_call(ToolInvocationRequest::from_json(
                "read_file",
                json!({"path": "A.java"}),
            )),
            Turn::tool_result(ToolResult::success("read_file", "class A {}".into())),
            Turn::model_text("{}"),
        ];
        let v = serde_json::to_value(to_contents(&turns)).unwrap();
        assert_eq!(
            v,
            json!([
                {"role": "user", "parts": [{"text": "diff"}]},
                {"role": "model", "parts": [{"functionCall": {"name": "read_file", "args": {"path": "A.java"}}}]},
                {"role": "function", "parts": [{"functionResponse": {
                    "name": "read_file",
                    "response": {"name": "read_file", "content": "class A {}"}
                }}]},
                {"role": "model", "parts": [{"text": "{}"}]}
            ])
        );
    }

    #[test]
    fn descriptors_become_function_declarations() {
        let decls = to_declarations(&[list_files_descriptor(), read_file_descriptor()]);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].name, "read_file");
        assert_eq!(decls[1].parameters["required"], json!(["path"]));
    }

    #[test]
    fn decodes_function_call_before_text() {
        let content = Content {
            role: Some("model".into()),
            parts: vec![
                Part::text("let me look"),
                Part::function_call(FunctionCall {
                    name: "list_files".into(),
                    args: json!({"directory": "src"}),
                }),
                Part::function_call(FunctionCall {
                    name: "read_file".into(),
                    args: json!({"path": "x"}),
                }),
            ],
        };
        match decode_reply(content).unwrap() {
            ModelReply::ToolCall(req) => {
                assert_eq!(req.name, "list_files");
                assert_eq!(req.arguments["directory"], "src");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decodes_text_as_final_answer() {
        let content = Content {
            role: Some("model".into()),
            parts: vec![Part::text("{\"summary\":"), Part::text("\"ok\"}")],
        };
        assert_eq!(
            decode_reply(content).unwrap(),
            ModelReply::FinalAnswer("{\"summary\":\n\"ok\"}".into())
        );
    }

    #[test]
    fn empty_content_is_a_decode_error() {
        let content = Content {
            role: Some("model".into()),
            parts: vec![],
        };
        assert!(matches!(decode_reply(content), Err(AiLlmError::Provider(_))));
    }
}

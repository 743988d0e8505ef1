//! Append-only conversation log passed to every model call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Requester,
    Model,
    ToolResult,
}

/// Model request to run a named local tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRequest {
    pub name: String,
    /// Raw arguments as sent by the model; the registry rejects non-objects.
    pub arguments: Value,
}

impl ToolInvocationRequest {
    /// Builds a request from raw model arguments. `null` means "no
    /// arguments"; any other value is kept as sent.
    pub fn from_json(name: impl Into<String>, args: Value) -> Self {
        let arguments = match args {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of one tool invocation, as fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(name: &str, output: String) -> Self {
        Self {
            name: name.to_string(),
            output,
            is_error: false,
        }
    }

    pub fn failure(name: &str, err: &dyn std::fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            output: format!("Error: {err}"),
            is_error: true,
        }
    }
}

/// Payload of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnContent {
    Text { text: String },
    ToolCall(ToolInvocationRequest),
    ToolResult(ToolResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn requester(text: impl Into<String>) -> Self {
        Self {
            role: Role::Requester,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::Text { text: text.into() },
        }
    }

    pub fn model_call(request: ToolInvocationRequest) -> Self {
        Self {
            role: Role::Model,
            content: TurnContent::ToolCall(request),
        }
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::ToolResult,
            content: TurnContent::ToolResult(result),
        }
    }
}

/// Ordered history. Turns are only ever appended; there is no pruning, so
/// every model call carries the full conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

}

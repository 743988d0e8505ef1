//! Tool registry: named local callables the model may request.
//!
//! A tool is a [`ToolDescriptor`] (what the model sees) plus a synchronous
//! handler (what runs locally). Arguments arrive from the model and are
//! untrusted, so [`ToolRegistry::invoke`] checks them against the declared
//! parameters before the handler runs. Every failure becomes an error-bearing
//! [`ToolResult`]; nothing in here aborts the agent loop.

pub mod fs;

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::agent::transcript::{ToolInvocationRequest, ToolResult};
use crate::errors::{ConfigError, ReviewError, ReviewResult};

/// JSON type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }

    fn accepts(self, v: &Value) -> bool {
        match self {
            ParamType::String => v.is_string(),
            ParamType::Integer => v.is_i64() || v.is_u64(),
            ParamType::Number => v.is_number(),
            ParamType::Boolean => v.is_boolean(),
        }
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// What the model is told about a tool. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            params,
        }
    }

    /// Object schema in the OpenAPI subset accepted by function declarations.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            properties.insert(
                p.name.clone(),
                json!({ "type": p.kind.as_str(), "description": p.description }),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({ "type": "object", "properties": properties });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Short signature used when listing tools in a prompt,
    /// e.g. `list_files(directory?: string, depth?: integer)`.
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| {
                let opt = if p.required { "" } else { "?" };
                format!("{}{}: {}", p.name, opt, p.kind.as_str())
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }

    /// Checks untrusted arguments: required present, declared types match.
    /// Undeclared extra arguments are ignored.
    fn validate(&self, args: &Map<String, Value>) -> Result<(), ToolError> {
        for p in &self.params {
            match args.get(&p.name) {
                None | Some(Value::Null) if p.required => {
                    return Err(ToolError::MissingArgument(p.name.clone()));
                }
                None | Some(Value::Null) => {}
                Some(v) if !p.kind.accepts(v) => {
                    return Err(ToolError::InvalidArgument {
                        name: p.name.clone(),
                        expected: p.kind.as_str(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Failure of a single tool invocation. Rendered into the transcript.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    NotFound(String),

    #[error("missing required argument `{0}`")]
    MissingArgument(String),

    #[error("argument `{name}` must be of type {expected}")]
    InvalidArgument { name: String, expected: &'static str },

    #[error("arguments must be a JSON object of named parameters, got {0}")]
    ArgumentsNotObject(&'static str),

    #[error("path `{path}` rejected: {reason}")]
    PathRejected { path: String, reason: &'static str },

    #[error("`{0}` is not a directory")]
    NotADirectory(String),

    #[error("`{0}` is not a regular file")]
    NotAFile(String),

    #[error("cannot access `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Typed read access to validated arguments.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a>(&'a Map<String, Value>);

impl<'a> ToolArgs<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }

    pub fn require_str(&self, name: &str) -> Result<&'a str, ToolError> {
        self.str(name)
            .ok_or_else(|| ToolError::MissingArgument(name.to_string()))
    }
}

/// Local implementation of a tool.
pub type ToolHandler = Box<dyn Fn(ToolArgs<'_>) -> Result<String, ToolError> + Send + Sync>;

/// Name → (descriptor, handler), iterated in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    handlers: Vec<ToolHandler>,
    index: HashMap<String, usize>,
}

/// A registered tool borrowed from the registry.
pub struct ResolvedTool<'r> {
    pub descriptor: &'r ToolDescriptor,
    handler: &'r ToolHandler,
}

impl ResolvedTool<'_> {
    /// Runs the handler without argument validation.
    pub fn call(&self, args: ToolArgs<'_>) -> Result<String, ToolError> {
        (self.handler)(args)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.index.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `list_files` and `read_file` confined to `root`.
    ///
    /// # Errors
    /// [`ReviewError::Workspace`] if `root` cannot be canonicalized.
    pub fn with_workspace_tools(root: impl AsRef<Path>) -> ReviewResult<Self> {
        let root = root.as_ref();
        let workspace = fs::Workspace::open(root).map_err(|source| ReviewError::Workspace {
            path: root.to_path_buf(),
            source,
        })?;

        let mut reg = Self::new();
        let ws = workspace.clone();
        reg.register(fs::list_files_descriptor(), move |args| ws.list_files(args))?;
        let ws = workspace;
        reg.register(fs::read_file_descriptor(), move |args| ws.read_file(args))?;
        Ok(reg)
    }

    /// Adds a tool. Names are unique; a duplicate is a startup error.
    pub fn register<F>(&mut self, descriptor: ToolDescriptor, handler: F) -> Result<(), ConfigError>
    where
        F: Fn(ToolArgs<'_>) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        if self.index.contains_key(&descriptor.name) {
            return Err(ConfigError::DuplicateTool(descriptor.name));
        }
        debug!(tool = %descriptor.name, params = descriptor.params.len(), "tool registered");
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(descriptor);
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedTool<'_>, ToolError> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        Ok(ResolvedTool {
            descriptor: &self.descriptors[idx],
            handler: &self.handlers[idx],
        })
    }

    /// Descriptors in registration order.
    pub fn describe(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Resolves, validates and executes a model request.
    ///
    /// Never fails: every error is turned into an error [`ToolResult`].
    pub fn invoke(&self, request: &ToolInvocationRequest) -> ToolResult {
        let outcome = self.resolve(&request.name).and_then(|tool| {
            let args = request
                .arguments
                .as_object()
                .ok_or_else(|| ToolError::ArgumentsNotObject(json_kind(&request.arguments)))?;
            tool.descriptor.validate(args)?;
            tool.call(ToolArgs::new(args))
        });

        match outcome {
            Ok(output) => {
                debug!(tool = %request.name, bytes = output.len(), "tool succeeded");
                ToolResult::success(&request.name, output)
            }
            Err(e) => {
                warn!(tool = %request.name, error = %e, "tool failed");
                ToolResult::failure(&request.name, &e)
            }
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

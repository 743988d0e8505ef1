//! Shared LLM client layer for the reviewer.
//!
//! - [`config`]: model configs built strictly from environment variables.
//! - [`services`]: provider HTTP clients (Gemini `generateContent` with
//!   function calling and JSON output mode).
//! - [`error_handler`]: unified [`AiLlmError`] and env/validation helpers.
//! - [`telemetry`]: `tracing` layer and filter helpers for the binary to compose.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::{AiLlmError, Result};
pub use services::gemini_service::{
    Content, FunctionCall, FunctionDeclaration, FunctionResponse, GeminiService,
    GenerateOptions, Part,
};

//! Default LLM configs loaded strictly from environment variables.
//!
//! # Environment variables
//!
//! - `GEMINI_API_KEY`   = API key (mandatory)
//! - `GEMINI_MODEL`     = model id (default `gemini-1.5-pro-latest`)
//! - `GEMINI_API_URL`   = API base (default `https://generativelanguage.googleapis.com/v1beta`)
//! - `LLM_MAX_TOKENS`   = optional max output tokens (u32)
//! - `LLM_TEMPERATURE`  = optional sampling temperature (0.0..=2.0, default 0.2)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (default 120)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, must_lookup, parse_opt, validate_http_endpoint,
        validate_range_f32,
    },
};

/// Default Gemini model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro-latest";

/// Default Generative Language API base.
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Constructs the Gemini config from process environment.
///
/// # Errors
///
/// - [`ConfigError::MissingVar`](crate::error_handler::ConfigError::MissingVar) if `GEMINI_API_KEY` is missing
/// - [`ConfigError::InvalidNumber`](crate::error_handler::ConfigError::InvalidNumber) / [`ConfigError::OutOfRange`](crate::error_handler::ConfigError::OutOfRange) for bad tuning values
/// - [`ConfigError::InvalidFormat`](crate::error_handler::ConfigError::InvalidFormat) if `GEMINI_API_URL` is not http(s)
pub fn config_gemini() -> Result<LlmModelConfig, AiLlmError> {
    config_gemini_from(|k| std::env::var(k).ok())
}

/// Constructs the Gemini config from an arbitrary key lookup.
///
/// Useful when configuration comes from somewhere other than the process
/// environment (tests, a parsed `.env`, CI inputs).
pub fn config_gemini_from<F>(lookup: F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = must_lookup("GEMINI_API_KEY", &lookup)?;

    let model = lookup("GEMINI_MODEL")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

    let endpoint = lookup("GEMINI_API_URL")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string());
    validate_http_endpoint("GEMINI_API_URL", &endpoint)?;

    let max_tokens = parse_opt::<u32>("LLM_MAX_TOKENS", lookup("LLM_MAX_TOKENS"), "expected u32")?;
    let temperature = parse_opt::<f32>(
        "LLM_TEMPERATURE",
        lookup("LLM_TEMPERATURE"),
        "expected floating point number",
    )?
    .unwrap_or(0.2);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;

    let timeout_secs = parse_opt::<u64>(
        "LLM_TIMEOUT_SECS",
        lookup("LLM_TIMEOUT_SECS"),
        "expected u64",
    )?
    .unwrap_or(120);

    Ok(LlmModelConfig {
        provider: LlmProvider::Gemini,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::ConfigError;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let cfg = config_gemini_from(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(cfg.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(cfg.endpoint, DEFAULT_GEMINI_API_URL);
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.temperature, Some(0.2));
        assert_eq!(cfg.timeout_secs, Some(120));
        assert_eq!(cfg.max_tokens, None);
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = config_gemini_from(lookup_from(&[])).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::MissingVar("GEMINI_API_KEY"))
        ));
    }

    #[test]
    fn overrides_are_parsed_and_validated() {
        let cfg = config_gemini_from(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("LLM_MAX_TOKENS", "4096"),
            ("LLM_TEMPERATURE", "0.7"),
        ]))
        .unwrap();
        assert_eq!(cfg.model, "gemini-2.5-pro");
        assert_eq!(cfg.max_tokens, Some(4096));
        assert_eq!(cfg.temperature, Some(0.7));

        let err = config_gemini_from(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("LLM_TEMPERATURE", "9"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AiLlmError::Config(ConfigError::OutOfRange { .. })));

        let err = config_gemini_from(lookup_from(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_API_URL", "generativelanguage.googleapis.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AiLlmError::Config(ConfigError::InvalidFormat { .. })));
    }
}

/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// Only Google's Generative Language API is wired today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Gemini via `models/{model}:generateContent`.
    Gemini,
}

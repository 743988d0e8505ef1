//! Validation of the model's final answer into a review payload.
//!
//! Expected shape: `{"summary": "...", "reviews": [{"path", "line", "body"}]}`.
//! Either a non-blank `summary` or a `reviews` array must be present; the
//! other one defaults to empty. An object with neither, or any invalid item,
//! rejects the whole payload so the raw text can be published instead.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub path: String,
    pub line: u32,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPayload {
    pub summary: String,
    pub reviews: Vec<ReviewItem>,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("final answer is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("final answer has neither `summary` nor `reviews`")]
    MissingFields,

    #[error("review #{index}: {reason}")]
    InvalidItem { index: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    reviews: Option<Vec<Value>>,
}

impl ReviewPayload {
    /// Parses a final answer, tolerating surrounding code fences.
    pub fn parse(raw: &str) -> Result<Self, PayloadError> {
        let cleaned = cleanup_json_like(raw);
        let parsed: RawPayload = serde_json::from_str(&cleaned)?;

        let summary = parsed.summary.filter(|s| !s.trim().is_empty());
        if summary.is_none() && parsed.reviews.is_none() {
            return Err(PayloadError::MissingFields);
        }

        let reviews = parsed
            .reviews
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, v)| {
                parse_item(v).map_err(|reason| PayloadError::InvalidItem { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            summary: summary.unwrap_or_default(),
            reviews,
        })
    }
}

fn parse_item(v: &Value) -> Result<ReviewItem, String> {
    let obj = v.as_object().ok_or("not an object")?;

    let path = obj
        .get("path")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or("`path` must be a non-empty string")?;

    let line = obj
        .get("line")
        .and_then(parse_line)
        .ok_or("`line` must be a positive integer")?;

    let body = obj
        .get("body")
        .and_then(Value::as_str)
        .filter(|b| !b.trim().is_empty())
        .ok_or("`body` must be a non-empty string")?;

    Ok(ReviewItem {
        path: path.to_string(),
        line,
        body: body.to_string(),
    })
}

/// Integer, integral float or numeric string, >= 1.
fn parse_line(v: &Value) -> Option<u32> {
    let n: u64 = match v {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        })?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n >= 1)
}

/// Strips a surrounding ```` ```json ```` fence if present.
pub fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

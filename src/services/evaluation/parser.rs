use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Fields recovered from the evaluation service's free-form reply. Absent
/// fields stay `None`; the caller substitutes question-kind defaults.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StructuredEvaluation {
    pub(crate) score: f64,
    pub(crate) max_score: Option<f64>,
    pub(crate) feedback: Option<String>,
    pub(crate) model_answer: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ParseError {
    #[error("no JSON object found in reply")]
    NoJsonObject,
    #[error("embedded JSON is not valid: {0}")]
    InvalidJson(String),
    #[error("no score token found in reply")]
    NoScoreToken,
}

/// Parse a reply using the primary strategy (JSON object embedded in prose),
/// falling back to loose token extraction when that fails.
pub(crate) fn parse(raw: &str) -> Result<StructuredEvaluation, ParseError> {
    match parse_embedded_json(raw) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            tracing::debug!(error = %err, "Structured reply parse failed, trying loose extraction");
            parse_loose(raw)
        }
    }
}

/// Primary strategy: models are asked for a JSON object but tend to wrap it
/// in prose, so take the span from the first `{` to the last `}` and parse
/// that.
pub(crate) fn parse_embedded_json(raw: &str) -> Result<StructuredEvaluation, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = raw.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }

    let value: Value = serde_json::from_str(&raw[start..=end])
        .map_err(|err| ParseError::InvalidJson(err.to_string()))?;

    Ok(StructuredEvaluation {
        score: number_field(&value, "score").unwrap_or(0.0),
        max_score: number_field(&value, "maxScore"),
        feedback: string_field(&value, "feedback"),
        model_answer: string_field(&value, "modelAnswer"),
    })
}

/// Fallback strategy: pull a numeric score token and feedback/model-answer
/// text spans straight out of the raw reply. Errors when not even a score
/// token is present.
pub(crate) fn parse_loose(raw: &str) -> Result<StructuredEvaluation, ParseError> {
    static SCORE: OnceLock<Regex> = OnceLock::new();
    let score_re = SCORE
        .get_or_init(|| Regex::new(r#"(?i)score["\s:]+(\d+(?:\.\d+)?)"#).expect("score regex"));

    let score = score_re
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|token| token.as_str().parse::<f64>().ok())
        .ok_or(ParseError::NoScoreToken)?;

    Ok(StructuredEvaluation {
        score,
        max_score: None,
        feedback: extract_text_span(raw, "feedback"),
        model_answer: extract_text_span(raw, "modelAnswer"),
    })
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(number) => number.as_f64(),
        // Some models quote numbers; accept them.
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Look for `"<key>": "text"` first, then a bare `<key>: text` span running
/// to the end of the line.
fn extract_text_span(raw: &str, key: &str) -> Option<String> {
    let quoted = Regex::new(&format!(r#"(?i)"{key}"\s*:\s*"((?:[^"\\]|\\.)*)""#)).ok()?;
    if let Some(caps) = quoted.captures(raw) {
        let text = caps.get(1)?.as_str().replace("\\\"", "\"");
        let trimmed = text.trim().to_string();
        if !trimmed.is_empty() {
            return Some(trimmed);
        }
    }

    let bare = Regex::new(&format!(r"(?i){key}\s*[:：]\s*([^\n]+)")).ok()?;
    bare.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|span| span.as_str().trim().trim_matches(['"', ',']).trim().to_string())
        .filter(|text| !text.is_empty())
}

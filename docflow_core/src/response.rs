//! Parsing of model text into structured data.
//!
//! Models tend to wrap JSON in Markdown fences and surround it with prose.
//! [`parse_structured_response`] strips the fences, parses the remainder and
//! only accepts a JSON object.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseParseError {
    #[error("model response is empty")]
    Empty,

    #[error("model response is not valid JSON: {0}")]
    Syntax(String),

    #[error("model response is JSON but not an object (found {0})")]
    NotAnObject(&'static str),
}

/// Return the payload inside the first ```` ```json ```` fence, else the first
/// bare ```` ``` ```` fence, else the trimmed text unchanged.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let fenced = text
        .split_once("```json")
        .or_else(|| text.split_once("```"))
        .map(|(_, rest)| rest);

    match fenced {
        Some(rest) => rest.split_once("```").map_or(rest, |(inner, _)| inner).trim(),
        None => text,
    }
}

/// Strip fences, parse, and require a JSON object.
pub fn parse_structured_response(text: &str) -> Result<Map<String, Value>, ResponseParseError> {
    let payload = strip_code_fences(text);
    if payload.is_empty() {
        return Err(ResponseParseError::Empty);
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ResponseParseError::NotAnObject(json_kind(&other))),
        Err(e) => Err(ResponseParseError::Syntax(e.to_string())),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_object_parses() {
        let map = parse_structured_response(r#"{"sender_name": "Ana"}"#).unwrap();
        assert_eq!(map["sender_name"], json!("Ana"));
    }

    #[test]
    fn json_fence_is_stripped() {
        let text = "Here you go:\n```json\n{\"quantity\": 40}\n```\nAnything else?";
        assert_eq!(strip_code_fences(text), "{\"quantity\": 40}");
        let map = parse_structured_response(text).unwrap();
        assert_eq!(map["quantity"], json!(40));
    }

    #[test]
    fn bare_fence_is_stripped() {
        let text = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn unterminated_fence_keeps_tail() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn prose_is_a_syntax_error() {
        let err = parse_structured_response("I could not find any entities.").unwrap_err();
        assert!(matches!(err, ResponseParseError::Syntax(_)));
    }

    #[test]
    fn empty_response_is_rejected() {
        assert_eq!(parse_structured_response("   "), Err(ResponseParseError::Empty));
        assert_eq!(parse_structured_response("```json\n```"), Err(ResponseParseError::Empty));
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert_eq!(
            parse_structured_response("[1, 2]"),
            Err(ResponseParseError::NotAnObject("array"))
        );
        assert_eq!(
            parse_structured_response("\"Invoice\""),
            Err(ResponseParseError::NotAnObject("string"))
        );
    }
}

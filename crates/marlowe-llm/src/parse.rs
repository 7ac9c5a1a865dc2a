//! Tolerant parsing of model output
//!
//! Models sometimes wrap JSON in markdown code fences or prepend prose;
//! callers that asked for JSON get it extracted here.

use crate::LlmError;
use serde_json::Value;

/// Extract JSON from a model response, handling markdown code fences
pub fn extract_json(response: &str) -> Result<String, LlmError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(LlmError::InvalidResponse("Empty code block".to_string()));
        }
        // Skip the opening fence (``` or ```json) and the closing fence
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        return Ok(json_lines.join("\n"));
    }

    // Prose-wrapped JSON: slice from the first bracket to the last
    if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
        if let Some(start) = trimmed.find(['{', '[']) {
            let end = trimmed.rfind(['}', ']']).unwrap_or(trimmed.len() - 1);
            if end > start {
                return Ok(trimmed[start..=end].to_string());
            }
        }
    }

    Ok(trimmed.to_string())
}

/// Parse a model response expected to be a JSON value
pub fn parse_json_value(response: &str) -> Result<Value, LlmError> {
    let json_str = extract_json(response)?;
    serde_json::from_str(&json_str)
        .map_err(|e| LlmError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// Parse a model response expected to be a JSON array
pub fn parse_json_array(response: &str) -> Result<Vec<Value>, LlmError> {
    let value = parse_json_value(response)?;
    value
        .as_array()
        .cloned()
        .ok_or_else(|| LlmError::InvalidResponse("Expected JSON array".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_json() {
        let json = r#"{"key": "value"}"#;
        assert_eq!(extract_json(json).unwrap(), json);
    }

    #[test]
    fn test_extract_from_markdown_fence() {
        let response = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(response).unwrap().trim(), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_from_fence_without_language() {
        let response = "```\n[1, 2, 3]\n```";
        assert!(extract_json(response).unwrap().contains("[1, 2, 3]"));
    }

    #[test]
    fn test_extract_from_prose_wrapper() {
        let response = "Here is the result:\n[\"domain_age\", \"certificate\"] as requested.";
        let extracted = extract_json(response).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&extracted).unwrap();
        assert_eq!(parsed, vec!["domain_age", "certificate"]);
    }

    #[test]
    fn test_parse_array() {
        let values = parse_json_array(r#"["a", "b"]"#).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_parse_array_rejects_object() {
        assert!(parse_json_array(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse_json_value("not json at all").is_err());
    }
}

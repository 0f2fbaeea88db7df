//! Message content and its tagged parts.
//!
//! A [`Part`] carries exactly one populated variant. Shapes that match none
//! of the known variants are kept verbatim in [`Part::Other`]. Keys a known
//! variant does not model (`thought`, `thoughtSignature`, ...) ride along in
//! its `extra` map, so every part re-serializes without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role + ordered parts of a single message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Content holding a single text part.
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenation of every text part, in order.
    pub fn joined_text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// True when at least one part is a text part.
    pub fn has_text(&self) -> bool {
        self.parts.iter().any(|p| p.as_text().is_some())
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// The result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub response: Value,
}

/// Outcome of server-side code execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

/// One part of a message.
///
/// Variant order matters for deserialization: each known variant requires
/// its discriminating key, and anything else lands in `Other`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    CodeExecutionResult {
        #[serde(rename = "codeExecutionResult")]
        code_execution_result: CodeExecutionResult,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
    /// Unrecognized shape, preserved as received.
    Other(Value),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// The text of a text part, `None` for every other variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Keys carried next to the variant's own field. `None` for `Other`,
    /// whose whole value is kept as is.
    pub fn extra(&self) -> Option<&Map<String, Value>> {
        match self {
            Part::Text { extra, .. }
            | Part::FunctionCall { extra, .. }
            | Part::FunctionResponse { extra, .. }
            | Part::CodeExecutionResult { extra, .. } => Some(extra),
            Part::Other(_) => None,
        }
    }

    /// True for model reasoning text (`"thought": true`).
    pub fn is_thought(&self) -> bool {
        match self {
            Part::Text { extra, .. } => extra.get("thought") == Some(&Value::Bool(true)),
            _ => false,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Part::Text { .. })
    }

    /// Short label used by plain-text output.
    pub fn kind(&self) -> &'static str {
        match self {
            Part::Text { .. } => "text",
            Part::FunctionCall { .. } => "function_call",
            Part::FunctionResponse { .. } => "function_response",
            Part::CodeExecutionResult { .. } => "code_execution_result",
            Part::Other(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_part() {
        let part: Part = serde_json::from_value(json!({"text": "hi"})).unwrap();
        assert_eq!(part, Part::text("hi"));
    }

    #[test]
    fn test_parse_function_call_part() {
        let part: Part = serde_json::from_value(json!({
            "functionCall": {"id": "c1", "name": "get_weather", "args": {"city": "Paris"}}
        }))
        .unwrap();
        match part {
            Part::FunctionCall { function_call, .. } => {
                assert_eq!(function_call.name, "get_weather");
                assert_eq!(function_call.args["city"], "Paris");
                assert_eq!(function_call.id.as_deref(), Some("c1"));
            }
            other => panic!("Expected FunctionCall, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function_response_part() {
        let part: Part = serde_json::from_value(json!({
            "functionResponse": {"name": "get_weather", "response": {"temp": 21}}
        }))
        .unwrap();
        assert_eq!(part.kind(), "function_response");
    }

    #[test]
    fn test_parse_code_execution_part_with_missing_fields() {
        let part: Part =
            serde_json::from_value(json!({"codeExecutionResult": {"result": "42"}})).unwrap();
        match part {
            Part::CodeExecutionResult {
                code_execution_result,
                ..
            } => {
                assert_eq!(code_execution_result.result.as_deref(), Some("42"));
                assert!(code_execution_result.status.is_none());
                assert!(code_execution_result.logs.is_none());
            }
            other => panic!("Expected CodeExecutionResult, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_part_is_preserved_verbatim() {
        let raw = json!({"inlineData": {"mimeType": "image/png", "data": "AAAA"}});
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(part, Part::Other(raw.clone()));
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }

    #[test]
    fn test_thought_text_keeps_extra_keys() {
        let raw = json!({"text": "let me think", "thought": true});
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(part.as_text(), Some("let me think"));
        assert!(part.is_thought());
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }

    #[test]
    fn test_function_call_keeps_thought_signature() {
        let raw = json!({
            "functionCall": {"id": "c1", "name": "get_weather", "args": {"city": "Paris"}},
            "thoughtSignature": "abc"
        });
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(part.kind(), "function_call");
        assert_eq!(part.extra().unwrap()["thoughtSignature"], "abc");
        assert_eq!(serde_json::to_value(&part).unwrap(), raw);
    }

    #[test]
    fn test_plain_text_part_serializes_without_extra() {
        assert_eq!(serde_json::to_value(Part::text("hi")).unwrap(), json!({"text": "hi"}));
        assert!(!Part::text("hi").is_thought());
    }

    #[test]
    fn test_malformed_function_call_falls_back_to_other() {
        // missing required `name`
        let raw = json!({"functionCall": {"args": {}}});
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(part, Part::Other(raw));
    }

    #[test]
    fn test_joined_text_skips_non_text_parts() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![
                Part::text("a"),
                Part::Other(json!({"x": 1})),
                Part::text("b"),
            ],
        };
        assert_eq!(content.joined_text(), "ab");
        assert!(content.has_text());
    }
}

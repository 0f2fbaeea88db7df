//! Text extraction helpers for event content.

use super::content::{FunctionCall, FunctionResponse, Part};
use super::event::Event;

/// Text parts of an event joined with newlines, for display.
///
/// Empty text parts are skipped.
pub fn message_text(event: &Event) -> String {
    let Some(content) = &event.content else {
        return String::new();
    };
    content
        .parts
        .iter()
        .filter_map(Part::as_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// All function calls in an event, in part order.
pub fn function_calls(event: &Event) -> Vec<&FunctionCall> {
    parts(event)
        .filter_map(|p| match p {
            Part::FunctionCall { function_call, .. } => Some(function_call),
            _ => None,
        })
        .collect()
}

/// All function responses in an event, in part order.
pub fn function_responses(event: &Event) -> Vec<&FunctionResponse> {
    parts(event)
        .filter_map(|p| match p {
            Part::FunctionResponse { function_response, .. } => Some(function_response),
            _ => None,
        })
        .collect()
}

/// True when the last part of the event is a code execution result.
pub fn has_trailing_code_execution_result(event: &Event) -> bool {
    matches!(
        event.content.as_ref().and_then(|c| c.parts.last()),
        Some(Part::CodeExecutionResult { .. })
    )
}

/// Plain-text rendering of every part of an event, suitable for copying or
/// printing to a terminal.
pub fn copy_text(event: &Event) -> String {
    let mut out = String::new();
    for part in parts(event) {
        match part {
            Part::Text { text, .. } => {
                if text.is_empty() {
                    continue;
                }
                if part.is_thought() {
                    out.push_str("Thought: ");
                }
                out.push_str(text);
                out.push('\n');
            }
            Part::FunctionCall { function_call, .. } => {
                out.push_str(&format!(
                    "Tool call:\nName: {}\nArgs: {}\n",
                    function_call.name,
                    pretty(&function_call.args)
                ));
            }
            Part::FunctionResponse { function_response, .. } => {
                out.push_str(&format!(
                    "Tool response:\nName: {}\nResponse: {}\n",
                    function_response.name,
                    pretty(&function_response.response)
                ));
            }
            Part::CodeExecutionResult {
                code_execution_result: r,
                ..
            } => {
                out.push_str(&format!(
                    "Code execution result:\nStatus: {}\n",
                    r.status.as_deref().unwrap_or("unknown")
                ));
                if let Some(result) = r.result.as_deref().filter(|s| !s.is_empty()) {
                    out.push_str(&format!("Result: {}\n", result));
                }
                if let Some(logs) = r.logs.as_deref().filter(|s| !s.is_empty()) {
                    out.push_str(&format!("Logs: {}\n", logs));
                }
            }
            Part::Other(raw) => {
                out.push_str(&format!("Unknown content: {}\n", pretty(raw)));
            }
        }
    }
    if let Some(message) = &event.error_message {
        out.push_str(&format!(
            "Error{}: {}\n",
            event
                .error_code
                .as_deref()
                .map(|c| format!(" [{}]", c))
                .unwrap_or_default(),
            message
        ));
    }
    out.trim().to_string()
}

fn parts(event: &Event) -> impl Iterator<Item = &Part> {
    event.content.iter().flat_map(|c| c.parts.iter())
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

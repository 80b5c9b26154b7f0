//! Structured tool-call payloads.
//!
//! Accepts either `{"edits": [...]}` or a bare array of edit objects with
//! camelCase fields.

use serde::Deserialize;
use serde_json::Value;

use super::ProposedHunk;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolEdit {
    start_line: usize,
    #[serde(default)]
    original_line_count: usize,
    #[serde(default)]
    content: String,
    #[serde(default)]
    original_text: String,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToolCallPayload {
    Wrapped { edits: Vec<ToolEdit> },
    Bare(Vec<ToolEdit>),
}

impl ToolCallPayload {
    fn into_hunks(self) -> Vec<ProposedHunk> {
        let edits = match self {
            ToolCallPayload::Wrapped { edits } | ToolCallPayload::Bare(edits) => edits,
        };
        edits
            .into_iter()
            .map(|edit| ProposedHunk {
                start_line: edit.start_line,
                original_line_count: edit.original_line_count,
                content: edit.content,
                original_text: edit.original_text,
                explanation: edit.explanation,
            })
            .collect()
    }
}

/// Parse a tool call's JSON arguments into hunks.
///
/// Returns None when `arguments` is not JSON at all, so the caller can treat
/// it as prose. Well-formed JSON of the wrong shape yields no hunks.
pub fn extract_tool_call(arguments: &str) -> Option<Vec<ProposedHunk>> {
    let value = serde_json::from_str::<Value>(arguments).ok()?;
    Some(extract_tool_call_value(value))
}

/// Same as [`extract_tool_call`] for arguments the host already parsed
pub fn extract_tool_call_value(arguments: Value) -> Vec<ProposedHunk> {
    match serde_json::from_value::<ToolCallPayload>(arguments) {
        Ok(payload) => payload.into_hunks(),
        Err(err) => {
            log::warn!(
                target: "edit_suggest::extract",
                "Ignoring malformed tool call payload: {err}"
            );
            Vec::new()
        }
    }
}

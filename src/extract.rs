//! Edit extraction from assistant output.
//!
//! Two input shapes are understood:
//! - fenced diff blocks in free text (see [`diff`])
//! - structured tool calls carrying a JSON edit list (see [`tool_call`])
//!
//! Both reduce to [`ProposedHunk`] before becoming [`Edit`]s. Extraction never
//! fails: anything incomplete or malformed is skipped.

pub mod diff;
pub mod tool_call;

use crate::config::ExtractionSettings;
use crate::edit::Edit;

pub use diff::extract_diff_hunks;
pub use tool_call::{extract_tool_call, extract_tool_call_value};

/// A line-ranged hunk as proposed by the assistant, before kind derivation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposedHunk {
    pub start_line: usize,
    pub original_line_count: usize,
    pub content: String,
    /// Lines the hunk claims to replace, if it listed them
    pub original_text: String,
    pub explanation: Option<String>,
}

impl ProposedHunk {
    /// Convert into a pending edit with a fresh id.
    ///
    /// Returns None when the hunk has no valid anchor or carries no change.
    pub fn into_edit(self) -> Option<Edit> {
        let start_line = match (self.start_line, self.original_line_count) {
            // "@@ -0,0 @@" anchors an insertion at the top of the document
            (0, 0) => 1,
            (0, _) => return None,
            (line, _) => line,
        };
        let edit = Edit::from_parts(
            start_line,
            self.original_line_count,
            self.content,
            self.original_text,
        )?;
        Some(match self.explanation {
            Some(explanation) => edit.with_explanation(explanation),
            None => edit,
        })
    }
}

/// Extract pending edits from one assistant turn.
///
/// Output that parses as a JSON object or array is read as a tool call;
/// anything else, including prose that merely opens with a bracket, is scanned
/// for fenced diff blocks.
pub fn extract_edits(output: &str, settings: &ExtractionSettings) -> Vec<Edit> {
    let trimmed = output.trim_start();
    let tool_call = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        extract_tool_call(trimmed)
    } else {
        None
    };
    let hunks = tool_call.unwrap_or_else(|| extract_diff_hunks(output, settings));

    let edits: Vec<Edit> = hunks
        .into_iter()
        .filter_map(ProposedHunk::into_edit)
        .collect();
    log::debug!(
        target: "edit_suggest::extract",
        "Extracted {} edit(s) from assistant output",
        edits.len()
    );
    edits
}

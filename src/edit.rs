//! Edit records proposed by the assistant.
//!
//! An [`Edit`] carries an [`EditOp`] whose variant is derived from the
//! structural fields of the proposal, never from a caller-supplied label:
//!
//! | `original_line_count` | `content` | kind    |
//! |-----------------------|-----------|---------|
//! | 0                     | non-empty | insert  |
//! | > 0                   | empty     | delete  |
//! | > 0                   | non-empty | replace |
//!
//! A proposal with neither lines to consume nor content is not an edit.

use std::fmt;

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use ulid::Ulid;

/// Unique, never reused identifier for an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditId(Ulid);

impl EditId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EditId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Operation kind, derived from the edit's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKind {
    Insert,
    Delete,
    Replace,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditKind::Insert => "insert",
            EditKind::Delete => "delete",
            EditKind::Replace => "replace",
        }
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Inclusive 1-based line span occupied by an edit.
///
/// Insertions occupy their anchor line only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn overlaps(&self, other: &LineSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Line-ranged operation, keyed by its derived kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum EditOp {
    /// Insert `content` as whole lines before `start_line`
    Insert { start_line: usize, content: String },
    /// Remove `line_count` lines starting at `start_line`
    Delete {
        start_line: usize,
        line_count: usize,
        original_text: String,
    },
    /// Replace `line_count` lines starting at `start_line` with `content`
    Replace {
        start_line: usize,
        line_count: usize,
        content: String,
        original_text: String,
    },
}

impl EditOp {
    /// Derive the operation from a proposal's structural fields.
    ///
    /// Returns None for a proposal that neither consumes lines nor adds content.
    pub fn derive(
        start_line: usize,
        original_line_count: usize,
        content: impl Into<String>,
        original_text: impl Into<String>,
    ) -> Option<Self> {
        let content = content.into();
        match (original_line_count, content.is_empty()) {
            (0, true) => None,
            (0, false) => Some(EditOp::Insert {
                start_line,
                content,
            }),
            (line_count, true) => Some(EditOp::Delete {
                start_line,
                line_count,
                original_text: original_text.into(),
            }),
            (line_count, false) => Some(EditOp::Replace {
                start_line,
                line_count,
                content,
                original_text: original_text.into(),
            }),
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            EditOp::Insert { .. } => EditKind::Insert,
            EditOp::Delete { .. } => EditKind::Delete,
            EditOp::Replace { .. } => EditKind::Replace,
        }
    }

    pub fn start_line(&self) -> usize {
        match self {
            EditOp::Insert { start_line, .. }
            | EditOp::Delete { start_line, .. }
            | EditOp::Replace { start_line, .. } => *start_line,
        }
    }

    pub fn original_line_count(&self) -> usize {
        match self {
            EditOp::Insert { .. } => 0,
            EditOp::Delete { line_count, .. } | EditOp::Replace { line_count, .. } => *line_count,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            EditOp::Insert { content, .. } | EditOp::Replace { content, .. } => content,
            EditOp::Delete { .. } => "",
        }
    }

    pub fn original_text(&self) -> &str {
        match self {
            EditOp::Insert { .. } => "",
            EditOp::Delete { original_text, .. } | EditOp::Replace { original_text, .. } => {
                original_text
            }
        }
    }

    /// Lines the edit occupies; the end saturates for coordinates past `usize::MAX`
    pub fn span(&self) -> LineSpan {
        let start = self.start_line();
        let end = start.saturating_add(self.original_line_count().saturating_sub(1));
        LineSpan { start, end }
    }

    pub(crate) fn set_original_text(&mut self, text: String) {
        match self {
            EditOp::Insert { .. } => {}
            EditOp::Delete { original_text, .. } | EditOp::Replace { original_text, .. } => {
                *original_text = text;
            }
        }
    }

    /// Move the edit by `delta` lines, never above line 1
    pub(crate) fn shift(&mut self, delta: isize) {
        let start = match self {
            EditOp::Insert { start_line, .. }
            | EditOp::Delete { start_line, .. }
            | EditOp::Replace { start_line, .. } => start_line,
        };
        *start = start.saturating_add_signed(delta).max(1);
    }
}

/// One suggested change awaiting review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub id: EditId,
    #[serde(flatten)]
    op: EditOp,
    pub status: EditStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Edit {
    /// Create a pending edit with a fresh id
    pub fn new(op: EditOp) -> Self {
        Self {
            id: EditId::new(),
            op,
            status: EditStatus::Pending,
            explanation: None,
        }
    }

    /// Build a pending edit from raw proposal fields, see [`EditOp::derive`]
    pub fn from_parts(
        start_line: usize,
        original_line_count: usize,
        content: impl Into<String>,
        original_text: impl Into<String>,
    ) -> Option<Self> {
        EditOp::derive(start_line, original_line_count, content, original_text).map(Self::new)
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        self.explanation = (!explanation.trim().is_empty()).then_some(explanation);
        self
    }

    pub fn op(&self) -> &EditOp {
        &self.op
    }

    pub(crate) fn op_mut(&mut self) -> &mut EditOp {
        &mut self.op
    }

    pub fn kind(&self) -> EditKind {
        self.op.kind()
    }

    pub fn start_line(&self) -> usize {
        self.op.start_line()
    }

    pub fn original_line_count(&self) -> usize {
        self.op.original_line_count()
    }

    pub fn content(&self) -> &str {
        self.op.content()
    }

    pub fn original_text(&self) -> &str {
        self.op.original_text()
    }

    pub fn span(&self) -> LineSpan {
        self.op.span()
    }

    pub fn is_pending(&self) -> bool {
        self.status == EditStatus::Pending
    }

    /// Render the change as `-`/`+` prefixed lines for display
    pub fn preview(&self) -> String {
        let old = with_terminator(self.original_text());
        let new = with_terminator(self.content());
        let diff = TextDiff::from_lines(old.as_str(), new.as_str());
        let mut output = String::new();

        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            output.push_str(sign);
            output.push_str(change.value());
        }

        output
    }
}

fn with_terminator(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::insert(0, "new", Some(EditKind::Insert))]
    #[case::delete(2, "", Some(EditKind::Delete))]
    #[case::replace(1, "new", Some(EditKind::Replace))]
    #[case::empty(0, "", None)]
    fn test_derive_kind(
        #[case] original_line_count: usize,
        #[case] content: &str,
        #[case] expected: Option<EditKind>,
    ) {
        let op = EditOp::derive(3, original_line_count, content, "");
        assert_eq!(op.map(|op| op.kind()), expected);
    }

    #[test]
    fn span_of_insertion_is_anchor_line() {
        let op = EditOp::derive(4, 0, "x", "").unwrap();
        assert_eq!(op.span(), LineSpan { start: 4, end: 4 });
    }

    #[test]
    fn span_of_replace_covers_consumed_lines() {
        let op = EditOp::derive(2, 3, "x", "").unwrap();
        assert_eq!(op.span(), LineSpan { start: 2, end: 4 });
    }

    #[test]
    fn spans_overlap_when_sharing_a_line() {
        let a = LineSpan { start: 2, end: 3 };
        assert!(a.overlaps(&LineSpan { start: 3, end: 3 }));
        assert!(a.overlaps(&LineSpan { start: 1, end: 2 }));
        assert!(!a.overlaps(&LineSpan { start: 4, end: 5 }));
        assert!(!a.overlaps(&LineSpan { start: 1, end: 1 }));
    }

    #[test]
    fn span_saturates_for_huge_coordinates() {
        let op = EditOp::derive(usize::MAX, 2, "x", "").unwrap();
        assert_eq!(
            op.span(),
            LineSpan {
                start: usize::MAX,
                end: usize::MAX,
            }
        );
    }

    #[test]
    fn shift_saturates_at_line_one() {
        let mut op = EditOp::derive(3, 1, "x", "").unwrap();
        op.shift(2);
        assert_eq!(op.start_line(), 5);
        op.shift(-10);
        assert_eq!(op.start_line(), 1);
    }

    #[test]
    fn insertion_ignores_original_text() {
        let mut op = EditOp::derive(1, 0, "x", "ignored").unwrap();
        op.set_original_text("also ignored".to_string());
        assert_eq!(op.original_text(), "");
    }

    #[test]
    fn ids_are_unique() {
        let a = Edit::from_parts(1, 0, "a", "").unwrap();
        let b = Edit::from_parts(1, 0, "a", "").unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.is_pending());
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let edit = Edit::from_parts(1, 0, "a", "").unwrap().with_explanation("  ");
        assert_eq!(edit.explanation, None);
    }

    #[test]
    fn preview_renders_line_diff() {
        let edit = Edit::from_parts(2, 2, "\\section{Intro}\nkept", "\\section{Introduction}\nkept")
            .unwrap();
        insta::assert_snapshot!(edit.preview(), @r"
        -\section{Introduction}
        +\section{Intro}
         kept
        ");
    }

    #[test]
    fn serializes_with_flattened_kind() {
        let edit = Edit::from_parts(4, 1, "", "old").unwrap();
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["kind"], "delete");
        assert_eq!(json["startLine"], 4);
        assert_eq!(json["lineCount"], 1);
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn every_kind_serializes_its_anchor_as_start_line() {
        for edit in [
            Edit::from_parts(3, 0, "new", "").unwrap(),
            Edit::from_parts(3, 1, "", "").unwrap(),
            Edit::from_parts(3, 1, "new", "").unwrap(),
        ] {
            let json = serde_json::to_value(&edit).unwrap();
            assert_eq!(json["startLine"], 3, "{} anchor", edit.kind());
            assert!(json.get("line").is_none());
        }
    }
}

//! Policy gate between extraction and review.
//!
//! Every edit's derived kind is checked against the request's [`Intent`].
//! Coordinates are not checked here; a stale or out-of-range edit is the
//! engine's concern at application time.

use crate::buffer::DocumentBuffer;
use crate::edit::Edit;
use crate::intent::Intent;

/// Outcome of validating one assistant turn
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Permitted edits, in input order
    pub accepted: Vec<Edit>,
    /// One human-readable message per dropped edit
    pub violations: Vec<String>,
}

/// Split `edits` into permitted edits and policy violations.
///
/// Accepted deletes and replaces get their `original_text` snapshotted from
/// the buffer when their range fits it; otherwise the extracted text is kept.
/// The buffer is only read.
pub fn validate(edits: Vec<Edit>, intent: &Intent, buffer: &dyn DocumentBuffer) -> Validation {
    let mut validation = Validation::default();

    for mut edit in edits {
        let kind = edit.kind();
        if !intent.allows(kind) {
            validation.violations.push(violation_message(&edit, buffer));
            continue;
        }

        if edit.original_line_count() > 0 {
            let span = edit.span();
            if let Some(snapshot) = buffer.lines_in(span.start, span.end) {
                edit.op_mut().set_original_text(snapshot);
            }
        }
        validation.accepted.push(edit);
    }

    if !validation.violations.is_empty() {
        log::info!(
            target: "edit_suggest::validate",
            "Dropped {} edit(s) not permitted by the request",
            validation.violations.len()
        );
    }
    validation
}

fn violation_message(edit: &Edit, buffer: &dyn DocumentBuffer) -> String {
    let line = edit.start_line();
    let offending = match edit.original_text().lines().next() {
        Some(text) => Some(text.to_string()),
        None => buffer.line_content(line),
    };
    match offending {
        Some(text) => format!(
            "{} at line {line} is not permitted by this request: `{}`",
            edit.kind(),
            text.trim()
        ),
        None => format!("{} at line {line} is not permitted by this request", edit.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::TextBuffer;
    use crate::intent::classify_intent;

    fn sample_edits() -> Vec<Edit> {
        vec![
            Edit::from_parts(1, 0, "\\usepackage{graphicx}", "").unwrap(),
            Edit::from_parts(2, 1, "", "").unwrap(),
            Edit::from_parts(3, 1, "\\section{Results}", "").unwrap(),
        ]
    }

    #[test]
    fn restricted_intent_rejects_every_kind() {
        let buffer = TextBuffer::new("\\documentclass{article}\n% draft\n\\section{Result}");
        let intent = classify_intent("only view the document");

        let validation = validate(sample_edits(), &intent, &buffer);

        assert!(validation.accepted.is_empty());
        assert_eq!(validation.violations.len(), 3);
        assert_eq!(
            validation.violations[1],
            "delete at line 2 is not permitted by this request: `% draft`"
        );
    }

    #[test]
    fn permissive_intent_keeps_order() {
        let buffer = TextBuffer::new("a\nb\nc");
        let edits = sample_edits();
        let ids: Vec<_> = edits.iter().map(|e| e.id).collect();

        let validation = validate(edits, &Intent::permissive(), &buffer);

        assert!(validation.violations.is_empty());
        let accepted: Vec<_> = validation.accepted.iter().map(|e| e.id).collect();
        assert_eq!(accepted, ids);
    }

    #[test]
    fn partial_intent_filters_by_kind() {
        let buffer = TextBuffer::new("a\nb\nc");
        let intent = Intent {
            allow_delete: false,
            ..Intent::permissive()
        };

        let validation = validate(sample_edits(), &intent, &buffer);

        assert_eq!(validation.accepted.len(), 2);
        assert_eq!(validation.violations.len(), 1);
        assert!(validation.violations[0].starts_with("delete at line 2"));
    }

    #[test]
    fn snapshots_original_text_from_buffer() {
        let buffer = TextBuffer::new("a\nb\nc\nd");
        let edit = Edit::from_parts(2, 2, "X", "stale model copy").unwrap();

        let validation = validate(vec![edit], &Intent::permissive(), &buffer);

        assert_eq!(validation.accepted[0].original_text(), "b\nc");
    }

    #[test]
    fn out_of_range_edit_is_accepted_unchanged() {
        let buffer = TextBuffer::new("a\nb");
        let edit = Edit::from_parts(10, 2, "X", "model copy").unwrap();

        let validation = validate(vec![edit], &Intent::permissive(), &buffer);

        assert_eq!(validation.accepted.len(), 1);
        assert_eq!(validation.accepted[0].original_text(), "model copy");
    }

    #[test]
    fn huge_start_line_is_kept_for_the_engine_to_reject() {
        let buffer = TextBuffer::new("a\nb");
        let edit = Edit::from_parts(usize::MAX, 2, "x", "").unwrap();

        let validation = validate(vec![edit], &Intent::permissive(), &buffer);

        assert_eq!(validation.accepted.len(), 1);
        assert_eq!(validation.accepted[0].original_text(), "");
    }

    #[test]
    fn huge_line_count_does_not_snapshot() {
        let buffer = TextBuffer::new("a\nb");
        let hunks = crate::extract::extract_edits(
            "```diff\n@@ -1,4000000000000 @@\n+x\n```\n",
            &crate::config::ExtractionSettings::default(),
        );
        assert_eq!(hunks.len(), 1);

        let validation = validate(hunks, &Intent::permissive(), &buffer);

        assert_eq!(validation.accepted.len(), 1);
        assert_eq!(validation.accepted[0].original_line_count(), 4_000_000_000_000);
        assert_eq!(validation.accepted[0].original_text(), "");
    }

    #[test]
    fn violation_without_known_text_names_only_the_line() {
        let buffer = TextBuffer::new("a");
        let edit = Edit::from_parts(9, 1, "", "").unwrap();

        let validation = validate(vec![edit], &Intent::read_only(), &buffer);

        assert_eq!(
            validation.violations,
            vec!["delete at line 9 is not permitted by this request".to_string()]
        );
    }
}

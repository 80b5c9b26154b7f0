//! Edit application and rebase.
//!
//! Accepting an edit is one buffer transaction followed by one pass over the
//! rest of the set. The pass derives every decision from each edit's current
//! coordinates, which the previous accept already made consistent with the
//! buffer, so nothing is composed across calls.
//!
//! For every other pending edit `s`, with the accepted edit's span `A` and
//! `delta = count_lines(content) - original_line_count`:
//!
//! - `s` overlaps `A`: dropped from the set, unless both are insertions at
//!   the same anchor line, in which case `s` shifts by `delta`
//! - `s` starts after `A`: shifts by `delta`
//! - otherwise `s` is untouched
//!
//! The rebase pass runs only after the buffer accepted the transaction, so a
//! failure never leaves the set partially rebased.

use serde::Serialize;

use crate::buffer::{DocumentBuffer, RangeEdit};
use crate::config::ApplySettings;
use crate::edit::{Edit, EditId, EditKind, EditOp, EditStatus, LineSpan};
use crate::error::{SuggestError, SuggestResult};
use crate::queue::EditSet;
use crate::text::{count_lines, insertion_text, replacement_text};

/// Buffer range an edit addresses, 1-based, end exclusive.
///
/// Insertions always resolve to `[line,1]..[line,1]`; deletes and replaces
/// end at the max column of their last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedRange {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

/// What one successful accept did to the document and the set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptOutcome {
    pub id: EditId,
    pub range: ResolvedRange,
    /// Change in the document's line count
    pub delta_lines: isize,
    /// Pending edits whose start line moved
    pub shifted: Vec<EditId>,
    /// Pending edits removed because they overlapped the accepted region
    pub dropped: Vec<Edit>,
}

/// Resolve the range an edit addresses in the current buffer.
///
/// Fails with a human-readable reason when the coordinates do not fit.
pub fn resolve_range(op: &EditOp, buffer: &dyn DocumentBuffer) -> Result<ResolvedRange, String> {
    let line_count = buffer.line_count();
    match op {
        EditOp::Insert { start_line, .. } => {
            // One past the last line appends to the document
            if *start_line == 0 || *start_line > line_count + 1 {
                return Err(format!(
                    "insertion anchor line {start_line} is outside the document ({line_count} lines)"
                ));
            }
            Ok(ResolvedRange {
                start_line: *start_line,
                start_column: 1,
                end_line: *start_line,
                end_column: 1,
            })
        }
        EditOp::Delete {
            start_line,
            line_count: count,
            ..
        }
        | EditOp::Replace {
            start_line,
            line_count: count,
            ..
        } => {
            let end_line = start_line.saturating_add(count.saturating_sub(1));
            let end_column = match buffer.line_max_column(end_line) {
                Some(column) if *start_line >= 1 => column,
                _ => {
                    return Err(format!(
                        "lines {start_line}-{end_line} are outside the document ({line_count} lines)"
                    ));
                }
            };
            Ok(ResolvedRange {
                start_line: *start_line,
                start_column: 1,
                end_line,
                end_column,
            })
        }
    }
}

/// Build the single buffer transaction for an edit at its resolved range.
///
/// Deletes also consume one line terminator so exactly `line_count` lines
/// disappear; insertions past the last line attach after it.
fn transaction(op: &EditOp, range: ResolvedRange, buffer: &dyn DocumentBuffer) -> RangeEdit {
    let line_count = buffer.line_count();
    let mut edit = RangeEdit {
        start_line: range.start_line,
        start_column: range.start_column,
        end_line: range.end_line,
        end_column: range.end_column,
        text: String::new(),
    };

    match op {
        EditOp::Insert { content, .. } if range.start_line > line_count => {
            let end_column = buffer.line_max_column(line_count).unwrap_or(1);
            edit.start_line = line_count;
            edit.start_column = end_column;
            edit.end_line = line_count;
            edit.end_column = end_column;
            edit.text = format!("\n{}", replacement_text(content));
        }
        EditOp::Insert { content, .. } => {
            edit.text = insertion_text(content);
        }
        EditOp::Replace { content, .. } => {
            edit.text = replacement_text(content).to_string();
        }
        EditOp::Delete { .. } if range.end_line < line_count => {
            edit.end_line = range.end_line + 1;
            edit.end_column = 1;
        }
        EditOp::Delete { .. } if range.start_line > 1 => {
            edit.start_line = range.start_line - 1;
            edit.start_column = buffer.line_max_column(edit.start_line).unwrap_or(1);
        }
        // Deleting the whole document leaves its single empty line
        EditOp::Delete { .. } => {}
    }
    edit
}

/// Compare the buffer against the edit's snapshot of the lines it consumes
fn verify_snapshot(op: &EditOp, buffer: &dyn DocumentBuffer) -> Result<(), String> {
    let expected = op.original_text();
    if op.kind() == EditKind::Insert || expected.is_empty() {
        return Ok(());
    }
    let span = op.span();
    match buffer.lines_in(span.start, span.end) {
        Some(current) if current == expected => Ok(()),
        _ => Err(format!(
            "lines {}-{} changed since the edit was proposed",
            span.start, span.end
        )),
    }
}

/// Apply one visible pending edit to the buffer and rebase the rest of the set.
///
/// A stale or rejected edit is removed from the set and reported as an error;
/// no other edit is touched in that case.
pub fn accept(
    set: &mut EditSet,
    id: EditId,
    buffer: &mut dyn DocumentBuffer,
    settings: &ApplySettings,
) -> SuggestResult<AcceptOutcome> {
    let edit = set.get(id).ok_or(SuggestError::EditNotFound { id })?;
    if !edit.is_pending() {
        return Err(SuggestError::NotPending { id });
    }
    if !set.is_visible(id) {
        return Err(SuggestError::NotVisible { id });
    }
    let op = edit.op().clone();

    let range = match resolve_range(&op, buffer) {
        Ok(range) => range,
        Err(reason) => return Err(fail(set, id, SuggestError::stale(id, reason))),
    };
    if settings.verify_original_text
        && let Err(reason) = verify_snapshot(&op, buffer)
    {
        return Err(fail(set, id, SuggestError::stale(id, reason)));
    }

    let tx = transaction(&op, range, buffer);
    if let Err(err) = buffer.apply_edit(std::slice::from_ref(&tx)) {
        return Err(fail(set, id, SuggestError::Buffer(err)));
    }

    let delta_lines = count_lines(op.content()) as isize - op.original_line_count() as isize;
    let (shifted, dropped) = rebase(set, id, &op, delta_lines);

    if let Some(edit) = set.get_mut(id) {
        edit.status = EditStatus::Accepted;
    }

    log::debug!(
        target: "edit_suggest::engine",
        "Accepted {} {} at line {} (delta {:+}): {} shifted, {} dropped",
        op.kind(),
        id,
        range.start_line,
        delta_lines,
        shifted.len(),
        dropped.len()
    );

    Ok(AcceptOutcome {
        id,
        range,
        delta_lines,
        shifted,
        dropped,
    })
}

/// Remove a failed edit from the set and hand back the error
fn fail(set: &mut EditSet, id: EditId, err: SuggestError) -> SuggestError {
    log::warn!(target: "edit_suggest::engine", "{err}");
    set.remove(id);
    err
}

/// Re-derive the coordinates of every other pending edit after `accepted`
/// changed the document by `delta` lines.
fn rebase(
    set: &mut EditSet,
    accepted_id: EditId,
    accepted: &EditOp,
    delta: isize,
) -> (Vec<EditId>, Vec<Edit>) {
    let span = accepted.span();
    let accepted_is_insert = accepted.kind() == EditKind::Insert;
    let candidate = |edit: &Edit| edit.id != accepted_id && edit.is_pending();

    let dropped = set.extract_if(|edit| {
        candidate(edit)
            && edit.span().overlaps(&span)
            && !same_anchor_insertions(accepted_is_insert, span, edit)
    });

    let mut shifted = Vec::new();
    if delta != 0 {
        for edit in set.iter_mut().filter(|edit| candidate(edit)) {
            let after = edit.span().start > span.end;
            let tie = same_anchor_insertions(accepted_is_insert, span, edit);
            if after || tie {
                edit.op_mut().shift(delta);
                shifted.push(edit.id);
            }
        }
    }

    for edit in &dropped {
        log::debug!(
            target: "edit_suggest::engine",
            "Dropped conflicting {} {} at line {}",
            edit.kind(),
            edit.id,
            edit.start_line()
        );
    }
    (shifted, dropped)
}

/// Two insertions at the same anchor apply in sequence instead of conflicting
fn same_anchor_insertions(accepted_is_insert: bool, span: LineSpan, edit: &Edit) -> bool {
    accepted_is_insert && edit.kind() == EditKind::Insert && edit.start_line() == span.start
}

/// Remove a pending edit without touching the buffer or any other edit
pub fn reject(set: &mut EditSet, id: EditId) -> SuggestResult<Edit> {
    let edit = set.get(id).ok_or(SuggestError::EditNotFound { id })?;
    if !edit.is_pending() {
        return Err(SuggestError::NotPending { id });
    }
    let mut edit = set.remove(id).ok_or(SuggestError::EditNotFound { id })?;
    edit.status = EditStatus::Rejected;
    log::debug!(target: "edit_suggest::engine", "Rejected {} {}", edit.kind(), id);
    Ok(edit)
}

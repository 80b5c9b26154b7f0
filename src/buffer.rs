//! Document buffer abstraction.
//!
//! The host editor owns the live document. The engine only needs line-level
//! reads and one atomic multi-range replace, expressed by [`DocumentBuffer`].
//! [`TextBuffer`] is the in-memory implementation used by the CLI and tests.

use crate::error::BufferError;
use crate::text::{column_to_byte_in_line, max_column};

/// One range replacement inside a buffer transaction.
///
/// Lines and columns are 1-based; the end position is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEdit {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub text: String,
}

impl RangeEdit {
    fn start(&self) -> (usize, usize) {
        (self.start_line, self.start_column)
    }

    fn end(&self) -> (usize, usize) {
        (self.end_line, self.end_column)
    }
}

/// Line/column addressed document, as exposed by the host editor
pub trait DocumentBuffer {
    /// Number of lines; an empty document still has one (empty) line
    fn line_count(&self) -> usize;

    /// One past the last character of `line`, or None if the line does not exist
    fn line_max_column(&self, line: usize) -> Option<usize>;

    /// Content of `line` without its terminator
    fn line_content(&self, line: usize) -> Option<String>;

    /// Apply all ranges as one transaction: either every range lands or none does
    fn apply_edit(&mut self, ranges: &[RangeEdit]) -> Result<(), BufferError>;

    /// Lines `start..=end` joined with `\n`, or None if any is missing
    fn lines_in(&self, start: usize, end: usize) -> Option<String> {
        if start == 0 || end > self.line_count() {
            return None;
        }
        let mut lines = Vec::with_capacity(end.saturating_sub(start) + 1);
        for line in start..=end {
            lines.push(self.line_content(line)?);
        }
        Some(lines.join("\n"))
    }
}

/// Simple in-memory buffer backed by a vector of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    lines: Vec<String>,
}

impl TextBuffer {
    /// Create a buffer from text, splitting on `\n`.
    ///
    /// A trailing newline leaves an empty last line, as in a text editor.
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    /// Full document text
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .map(String::as_str)
    }

    fn byte_at(&self, line: usize, column: usize) -> Result<usize, BufferError> {
        self.line(line)
            .and_then(|text| column_to_byte_in_line(text, column))
            .ok_or(BufferError::OutOfBounds { line, column })
    }

    /// Check every range and return them sorted by start position
    fn checked_ranges<'a>(&self, ranges: &'a [RangeEdit]) -> Result<Vec<&'a RangeEdit>, BufferError> {
        let mut sorted: Vec<&RangeEdit> = ranges.iter().collect();
        for range in &sorted {
            self.byte_at(range.start_line, range.start_column)?;
            self.byte_at(range.end_line, range.end_column)?;
            if range.end() < range.start() {
                return Err(BufferError::InvertedRange {
                    start_line: range.start_line,
                    start_column: range.start_column,
                    end_line: range.end_line,
                    end_column: range.end_column,
                });
            }
        }

        sorted.sort_by_key(|range| range.start());
        for pair in sorted.windows(2) {
            if pair[1].start() < pair[0].end() {
                return Err(BufferError::OverlappingRanges {
                    line: pair[1].start_line,
                });
            }
        }
        Ok(sorted)
    }

    /// Splice one already-validated range
    fn splice(&mut self, range: &RangeEdit) -> Result<(), BufferError> {
        let start_byte = self.byte_at(range.start_line, range.start_column)?;
        let end_byte = self.byte_at(range.end_line, range.end_column)?;
        let prefix = &self.lines[range.start_line - 1][..start_byte];
        let suffix = &self.lines[range.end_line - 1][end_byte..];
        let joined = format!("{prefix}{}{suffix}", range.text);
        let replacement: Vec<String> = joined.split('\n').map(str::to_string).collect();
        self.lines
            .splice(range.start_line - 1..range.end_line, replacement);
        Ok(())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl DocumentBuffer for TextBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_max_column(&self, line: usize) -> Option<usize> {
        self.line(line).map(max_column)
    }

    fn line_content(&self, line: usize) -> Option<String> {
        self.line(line).map(str::to_string)
    }

    fn apply_edit(&mut self, ranges: &[RangeEdit]) -> Result<(), BufferError> {
        let sorted = self.checked_ranges(ranges)?;
        // Back to front so earlier positions stay valid
        for range in sorted.into_iter().rev() {
            self.splice(range)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (usize, usize), end: (usize, usize), text: &str) -> RangeEdit {
        RangeEdit {
            start_line: start.0,
            start_column: start.1,
            end_line: end.0,
            end_column: end.1,
            text: text.to_string(),
        }
    }

    #[test]
    fn new_splits_lines_and_keeps_trailing_empty_line() {
        let buffer = TextBuffer::new("A\nB\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_content(3).as_deref(), Some(""));
        assert_eq!(buffer.text(), "A\nB\n");
    }

    #[test]
    fn empty_document_has_one_line() {
        let buffer = TextBuffer::default();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line_max_column(1), Some(1));
    }

    #[test]
    fn line_access_is_one_based() {
        let buffer = TextBuffer::new("first\nsecond");
        assert_eq!(buffer.line_content(0), None);
        assert_eq!(buffer.line_content(1).as_deref(), Some("first"));
        assert_eq!(buffer.line_max_column(2), Some(7));
        assert_eq!(buffer.line_content(3), None);
    }

    #[test]
    fn apply_replaces_full_lines() {
        let mut buffer = TextBuffer::new("A\nB\nC\nD");
        buffer
            .apply_edit(&[range((2, 1), (2, 2), "X\nY")])
            .unwrap();
        assert_eq!(buffer.text(), "A\nX\nY\nC\nD");
    }

    #[test]
    fn apply_insertion_at_column_one() {
        let mut buffer = TextBuffer::new("A\nB");
        buffer.apply_edit(&[range((2, 1), (2, 1), "new\n")]).unwrap();
        assert_eq!(buffer.text(), "A\nnew\nB");
    }

    #[test]
    fn apply_multiple_ranges_atomically() {
        let mut buffer = TextBuffer::new("A\nB\nC");
        buffer
            .apply_edit(&[range((3, 1), (3, 2), "c"), range((1, 1), (1, 2), "a\na2")])
            .unwrap();
        assert_eq!(buffer.text(), "a\na2\nB\nc");
    }

    #[test]
    fn out_of_bounds_range_leaves_buffer_untouched() {
        let mut buffer = TextBuffer::new("A\nB");
        let result = buffer.apply_edit(&[
            range((1, 1), (1, 2), "changed"),
            range((5, 1), (5, 1), "nope"),
        ]);
        assert_eq!(
            result,
            Err(BufferError::OutOfBounds { line: 5, column: 1 })
        );
        assert_eq!(buffer.text(), "A\nB");
    }

    #[test]
    fn column_past_line_end_is_rejected() {
        let mut buffer = TextBuffer::new("abc");
        let result = buffer.apply_edit(&[range((1, 1), (1, 6), "")]);
        assert_eq!(
            result,
            Err(BufferError::OutOfBounds { line: 1, column: 6 })
        );
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let mut buffer = TextBuffer::new("A\nB\nC");
        let result = buffer.apply_edit(&[
            range((1, 1), (2, 2), "x"),
            range((2, 1), (3, 1), "y"),
        ]);
        assert_eq!(result, Err(BufferError::OverlappingRanges { line: 2 }));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let mut buffer = TextBuffer::new("A\nB");
        let result = buffer.apply_edit(&[range((2, 1), (1, 1), "x")]);
        assert!(matches!(result, Err(BufferError::InvertedRange { .. })));
    }

    #[test]
    fn lines_in_joins_range() {
        let buffer = TextBuffer::new("A\nB\nC");
        assert_eq!(buffer.lines_in(2, 3).as_deref(), Some("B\nC"));
        assert_eq!(buffer.lines_in(3, 4), None);
        assert_eq!(buffer.lines_in(0, 1), None);
    }

    #[test]
    fn lines_in_rejects_huge_span_without_allocating() {
        let buffer = TextBuffer::new("A\nB");
        assert_eq!(buffer.lines_in(1, usize::MAX), None);
        assert_eq!(buffer.lines_in(1, 4_000_000_000_000), None);
    }
}

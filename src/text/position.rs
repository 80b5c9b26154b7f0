/// Maximum 1-based column of a line: one past its last character.
///
/// Columns count characters, not bytes, so an empty line has max column 1.
#[inline(always)]
pub fn max_column(line_text: &str) -> usize {
    line_text.chars().count() + 1
}

/// Convert a 1-based character column to a byte offset within a line.
/// Returns None if the column is zero or beyond [`max_column`].
#[inline(always)]
pub fn column_to_byte_in_line(line_text: &str, column: usize) -> Option<usize> {
    if column == 0 {
        return None;
    }
    let target = column - 1;
    let mut byte_offset = 0;

    for (char_index, ch) in line_text.chars().enumerate() {
        if char_index == target {
            return Some(byte_offset);
        }
        byte_offset += ch.len_utf8();
    }

    // One past the last character addresses the end of the line
    if target == line_text.chars().count() {
        Some(byte_offset)
    } else {
        None
    }
}

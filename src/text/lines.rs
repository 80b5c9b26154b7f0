/// Count the lines an edit's content occupies once applied.
///
/// The empty string occupies no lines. A single trailing `\n` terminates the
/// last line instead of opening a new one, so `"X"` and `"X\n"` both count 1.
pub fn count_lines(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let body = content.strip_suffix('\n').unwrap_or(content);
    body.split('\n').count()
}

/// Text to splice over the full extent of the replaced lines.
///
/// The replaced range stops before the last line's terminator, so one trailing
/// newline in the content would otherwise open an extra empty line.
pub fn replacement_text(content: &str) -> &str {
    content.strip_suffix('\n').unwrap_or(content)
}

/// Text to splice at column 1 of the anchor line.
///
/// Inserted content must end with a newline so it occupies whole lines
/// before the anchor instead of merging into it.
pub fn insertion_text(content: &str) -> String {
    if content.ends_with('\n') {
        content.to_string()
    } else {
        format!("{content}\n")
    }
}

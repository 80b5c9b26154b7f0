//! Fenced diff block parsing.
//!
//! A proposal looks like:
//!
//! ````text
//! ```diff
//! @@ -12,2 +12,3 @@ tighten the introduction
//! -old line twelve
//! -old line thirteen
//! +new line one
//! +new line two
//! +new line three
//! ```
//! ````
//!
//! Only the header carries coordinates. Line numbers the model copies into
//! body lines (`+12: text`) are stripped, never parsed. A block without its
//! closing fence is still streaming and yields nothing.

use std::sync::LazyLock;

use regex::Regex;

use super::ProposedHunk;
use crate::config::ExtractionSettings;

const FENCE: &str = "```";

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@\s*-(\d+)(?:,(\d+))?(?:\s+\+\d+(?:,\d+)?)?\s*@@(.*)$")
        .expect("hunk header pattern is valid")
});

static FILE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:---|\+\+\+) (?:a/|b/|/dev/null)").expect("file header pattern is valid")
});

static LINE_NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[:|]\s?").expect("line number pattern is valid"));

/// Extract every complete hunk from the diff blocks in `output`
pub fn extract_diff_hunks(output: &str, settings: &ExtractionSettings) -> Vec<ProposedHunk> {
    fenced_blocks(output, &settings.fence_languages)
        .into_iter()
        .flat_map(|block| parse_block(&block, settings.strip_line_numbers))
        .collect()
}

/// Bodies of closed fenced blocks whose info string names one of `languages`
fn fenced_blocks<'a>(output: &'a str, languages: &[String]) -> Vec<Vec<&'a str>> {
    let mut blocks = Vec::new();
    // (is proposal block, collected lines)
    let mut open: Option<(bool, Vec<&str>)> = None;

    for line in output.lines() {
        let trimmed = line.trim();
        match open.take() {
            None => {
                if let Some(info) = trimmed.strip_prefix(FENCE) {
                    let language = info.split_whitespace().next().unwrap_or("");
                    let wanted = languages.iter().any(|l| l.eq_ignore_ascii_case(language));
                    open = Some((wanted, Vec::new()));
                }
            }
            Some((wanted, lines)) if trimmed == FENCE => {
                if wanted {
                    blocks.push(lines);
                }
            }
            Some((wanted, mut lines)) => {
                if wanted {
                    lines.push(line);
                }
                open = Some((wanted, lines));
            }
        }
    }

    if let Some((true, lines)) = open {
        log::debug!(
            target: "edit_suggest::extract",
            "Skipping unterminated diff block ({} line(s) so far)",
            lines.len()
        );
    }
    blocks
}

/// Hunk being accumulated while walking a block
struct PendingHunk {
    start_line: usize,
    original_line_count: usize,
    explanation: Option<String>,
    added: Vec<String>,
    removed: Vec<String>,
}

impl PendingHunk {
    fn finish(self) -> Option<ProposedHunk> {
        if !self.removed.is_empty() && self.removed.len() != self.original_line_count {
            log::warn!(
                target: "edit_suggest::extract",
                "Dropping hunk at line {}: header consumes {} line(s) but body removes {}",
                self.start_line,
                self.original_line_count,
                self.removed.len()
            );
            return None;
        }
        if self.original_line_count == 0 && self.added.is_empty() {
            log::debug!(
                target: "edit_suggest::extract",
                "Dropping empty hunk at line {}",
                self.start_line
            );
            return None;
        }
        Some(ProposedHunk {
            start_line: self.start_line,
            original_line_count: self.original_line_count,
            content: self.added.join("\n"),
            original_text: self.removed.join("\n"),
            explanation: self.explanation,
        })
    }
}

fn parse_header(line: &str) -> Option<PendingHunk> {
    let captures = HUNK_HEADER.captures(line)?;
    let start_line = captures.get(1)?.as_str().parse().ok()?;
    let original_line_count = match captures.get(2) {
        Some(count) => count.as_str().parse().ok()?,
        None => 1,
    };
    let explanation = captures
        .get(3)
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    Some(PendingHunk {
        start_line,
        original_line_count,
        explanation,
        added: Vec::new(),
        removed: Vec::new(),
    })
}

fn body_text(rest: &str, strip_line_numbers: bool) -> String {
    if strip_line_numbers {
        LINE_NUMBER_PREFIX.replace(rest, "").into_owned()
    } else {
        rest.to_string()
    }
}

fn parse_block(lines: &[&str], strip_line_numbers: bool) -> Vec<ProposedHunk> {
    let mut hunks = Vec::new();
    let mut current: Option<PendingHunk> = None;
    // Set after a malformed header so its body is not credited to the previous hunk
    let mut skipping = false;

    for line in lines {
        if line.starts_with("@@") {
            if let Some(hunk) = current.take().and_then(PendingHunk::finish) {
                hunks.push(hunk);
            }
            current = parse_header(line);
            skipping = current.is_none();
            if skipping {
                log::warn!(
                    target: "edit_suggest::extract",
                    "Ignoring malformed hunk header: {line}"
                );
            }
            continue;
        }

        if skipping || FILE_HEADER.is_match(line) {
            continue;
        }
        let Some(hunk) = current.as_mut() else {
            continue;
        };

        if let Some(rest) = line.strip_prefix('+') {
            hunk.added.push(body_text(rest, strip_line_numbers));
        } else if let Some(rest) = line.strip_prefix('-') {
            hunk.removed.push(body_text(rest, strip_line_numbers));
        }
        // Context lines, blank lines and "\ No newline" markers carry no change
    }

    if let Some(hunk) = current.and_then(PendingHunk::finish) {
        hunks.push(hunk);
    }
    hunks
}

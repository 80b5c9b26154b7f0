//! Default configuration values for edit-suggest.
//!
//! Kept in one place so serde field defaults and `Settings::default()` agree.

/// Number of suggestions shown for review at once
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Fenced code block info strings treated as edit proposals
pub fn default_fence_languages() -> Vec<String> {
    vec!["diff".to_string()]
}

pub fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

pub fn enabled() -> bool {
    true
}

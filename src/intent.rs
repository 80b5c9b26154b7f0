//! Edit permission inferred from the user's request.
//!
//! Classification is a best-effort heuristic behind the [`IntentClassifier`]
//! trait; the validator is the enforcement point. The default policy is
//! permissive: every kind is allowed unless a restriction phrase appears, in
//! which case every kind is disallowed regardless of the verbs used.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::edit::EditKind;

/// Permission flags for one request, immutable once computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub allow_insert: bool,
    pub allow_delete: bool,
    pub allow_replace: bool,
    /// Display hints, never used for enforcement
    pub hints: IntentHints,
}

/// Secondary signals picked up from the request text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IntentHints {
    pub mentions_insert: bool,
    pub mentions_delete: bool,
    pub mentions_replace: bool,
    pub reorder: bool,
    pub style: bool,
    pub dedupe: bool,
    /// Inspection verbs without any edit verb
    pub looks_read_only: bool,
    pub restricted: bool,
}

impl Intent {
    pub fn permissive() -> Self {
        Self {
            allow_insert: true,
            allow_delete: true,
            allow_replace: true,
            hints: IntentHints::default(),
        }
    }

    pub fn read_only() -> Self {
        Self {
            allow_insert: false,
            allow_delete: false,
            allow_replace: false,
            hints: IntentHints {
                restricted: true,
                ..IntentHints::default()
            },
        }
    }

    pub fn allows(&self, kind: EditKind) -> bool {
        match kind {
            EditKind::Insert => self.allow_insert,
            EditKind::Delete => self.allow_delete,
            EditKind::Replace => self.allow_replace,
        }
    }
}

impl Default for Intent {
    fn default() -> Self {
        Self::permissive()
    }
}

/// Strategy turning free text into an [`Intent`]
pub trait IntentClassifier {
    fn classify(&self, request: &str) -> Intent;
}

/// Keyword and phrase matching classifier
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

fn word_pattern(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|word| regex::escape(word).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("keyword pattern is valid")
}

static INSERT_VERBS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&["add", "adds", "adding", "insert", "inserting", "append", "include", "introduce", "write"])
});

static DELETE_VERBS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&["delete", "deleting", "remove", "removing", "drop", "erase", "cut", "strip"])
});

static REPLACE_VERBS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&[
        "replace", "edit", "fix", "change", "modify", "rewrite", "update", "correct", "rephrase",
        "reword", "improve", "refactor", "convert", "rename",
    ])
});

static RESTRICTION_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&[
        "only view",
        "just view",
        "view only",
        "read only",
        "read-only",
        "don't edit",
        "do not edit",
        "dont edit",
        "don't change",
        "do not change",
        "dont change",
        "don't modify",
        "do not modify",
        "don't touch",
        "do not touch",
        "never change",
        "never edit",
        "never modify",
        "without changing",
        "without editing",
        "no changes",
    ])
});

static INSPECTION_VERBS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&[
        "explain", "review", "check", "read", "look at", "summarize", "summarise", "describe",
        "analyze", "analyse", "show", "what", "why", "how",
    ])
});

static REORDER_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&["reorder", "move", "rearrange", "swap", "sort", "reorganize", "reorganise"])
});

static STYLE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&["format", "style", "indent", "indentation", "bold", "italic", "capitalize", "font"])
});

static DEDUPE_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    word_pattern(&["duplicate", "duplicates", "dedupe", "deduplicate", "redundant", "repeated"])
});

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, request: &str) -> Intent {
        let mentions_insert = INSERT_VERBS.is_match(request);
        let mentions_delete = DELETE_VERBS.is_match(request);
        let mentions_replace = REPLACE_VERBS.is_match(request);
        let restricted = RESTRICTION_PHRASES.is_match(request);
        let any_edit_verb = mentions_insert || mentions_delete || mentions_replace;

        let hints = IntentHints {
            mentions_insert,
            mentions_delete,
            mentions_replace,
            reorder: REORDER_WORDS.is_match(request),
            style: STYLE_WORDS.is_match(request),
            dedupe: DEDUPE_WORDS.is_match(request),
            looks_read_only: INSPECTION_VERBS.is_match(request) && !any_edit_verb,
            restricted,
        };

        if restricted {
            log::debug!(
                target: "edit_suggest::intent",
                "Restriction phrase found; disallowing all edits"
            );
        }

        let allowed = !restricted;
        Intent {
            allow_insert: allowed,
            allow_delete: allowed,
            allow_replace: allowed,
            hints,
        }
    }
}

/// Classify a request with the default [`KeywordClassifier`]
pub fn classify_intent(request: &str) -> Intent {
    KeywordClassifier.classify(request)
}

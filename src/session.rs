//! Review session: one owned pipeline per document.
//!
//! A [`ReviewSession`] ties extraction, intent classification, validation,
//! the suggestion queue and the engine together. Nothing is global, so any
//! number of documents can each hold their own session.

use serde_json::Value;

use crate::buffer::DocumentBuffer;
use crate::config::Settings;
use crate::edit::{Edit, EditId};
use crate::engine::{self, AcceptOutcome};
use crate::error::{SuggestError, SuggestResult};
use crate::extract::{ProposedHunk, extract_edits, extract_tool_call_value};
use crate::intent::{Intent, IntentClassifier, KeywordClassifier};
use crate::queue::{QueueEvent, SuggestionQueue};
use crate::validate::{Validation, validate};

/// Result of feeding one assistant turn into the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub intent: Intent,
    /// Number of edits now awaiting review
    pub ingested: usize,
    pub violations: Vec<String>,
}

pub struct ReviewSession {
    settings: Settings,
    classifier: Box<dyn IntentClassifier>,
    queue: SuggestionQueue,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("settings", &self.settings)
            .field("classifier", &"Box<dyn IntentClassifier>")
            .field("queue", &self.queue)
            .finish()
    }
}

impl ReviewSession {
    /// Create a session using the keyword classifier
    pub fn new(settings: Settings) -> Self {
        Self::with_classifier(settings, Box::new(KeywordClassifier))
    }

    pub fn with_classifier(settings: Settings, classifier: Box<dyn IntentClassifier>) -> Self {
        let queue = SuggestionQueue::new(settings.batch_size);
        Self {
            settings,
            classifier,
            queue,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start a new turn from raw assistant output (diff blocks or tool-call JSON).
    ///
    /// Replaces whatever was still under review.
    pub fn propose(
        &mut self,
        output: &str,
        request: &str,
        buffer: &dyn DocumentBuffer,
    ) -> Proposal {
        let edits = extract_edits(output, &self.settings.extraction);
        self.propose_edits(edits, request, buffer)
    }

    /// Start a new turn from tool-call arguments the host already parsed
    pub fn propose_tool_call(
        &mut self,
        arguments: Value,
        request: &str,
        buffer: &dyn DocumentBuffer,
    ) -> Proposal {
        let edits = extract_tool_call_value(arguments)
            .into_iter()
            .filter_map(ProposedHunk::into_edit)
            .collect();
        self.propose_edits(edits, request, buffer)
    }

    /// Start a new turn from already-extracted edits
    pub fn propose_edits(
        &mut self,
        edits: Vec<Edit>,
        request: &str,
        buffer: &dyn DocumentBuffer,
    ) -> Proposal {
        let intent = self.classifier.classify(request);
        let Validation {
            accepted,
            violations,
        } = validate(edits, &intent, buffer);
        let ingested = accepted.len();
        self.queue.ingest(accepted);
        log::info!(
            target: "edit_suggest::session",
            "{} suggestion(s) ready for review, {} rejected by policy",
            ingested,
            violations.len()
        );
        Proposal {
            intent,
            ingested,
            violations,
        }
    }

    pub fn visible_batch(&self) -> &[Edit] {
        self.queue.visible_batch()
    }

    pub fn backlog(&self) -> &[Edit] {
        self.queue.backlog()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn is_resolved(&self) -> bool {
        self.queue.is_resolved()
    }

    pub fn get(&self, id: EditId) -> Option<&Edit> {
        self.queue.edit_set().get(id)
    }

    /// Apply a visible edit to `buffer`, rebase the rest and advance if drained
    pub fn accept(
        &mut self,
        id: EditId,
        buffer: &mut dyn DocumentBuffer,
    ) -> SuggestResult<AcceptOutcome> {
        let result = engine::accept(self.queue.edit_set_mut(), id, buffer, &self.settings.apply);
        match &result {
            Ok(outcome) => {
                if self.settings.apply.report_conflicts && !outcome.dropped.is_empty() {
                    self.queue.push_event(QueueEvent::ConflictsDropped {
                        ids: outcome.dropped.iter().map(|edit| edit.id).collect(),
                    });
                }
                self.queue.advance_if_drained();
            }
            Err(err) => {
                // Failed edits already left the set; lookup errors change nothing
                if matches!(err, SuggestError::StaleEdit { .. } | SuggestError::Buffer(_)) {
                    self.queue.push_event(QueueEvent::EditFailed {
                        id,
                        reason: err.to_string(),
                    });
                    self.queue.advance_if_drained();
                }
            }
        }
        result
    }

    /// Drop a pending edit without touching the document
    pub fn reject(&mut self, id: EditId) -> SuggestResult<Edit> {
        let edit = engine::reject(self.queue.edit_set_mut(), id)?;
        self.queue.advance_if_drained();
        Ok(edit)
    }

    /// Forget every suggestion of the current turn
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Take all UI notifications raised since the last call
    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        self.queue.take_events()
    }
}

//! Suggestion queue: the visible batch and the backlog.
//!
//! The queue owns membership of the [`EditSet`] and its split into a bounded
//! visible batch and the remaining backlog. Coordinates are never touched here;
//! that is the engine's job.

use serde::Serialize;

use crate::config::defaults::DEFAULT_BATCH_SIZE;
use crate::edit::{Edit, EditId, EditStatus};

/// Notifications for the UI, drained with [`SuggestionQueue::take_events`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A fresh ingest only shows part of the set
    ShowingFirst { shown: usize, total: usize },
    /// The visible batch drained and more suggestions were promoted
    MoreSuggestionsReady { count: usize, remaining: usize },
    /// Nothing is left to review
    AllResolved,
    /// Accepting an edit invalidated these overlapping edits
    ConflictsDropped { ids: Vec<EditId> },
    /// An edit no longer fit the document and was removed
    EditFailed { id: EditId, reason: String },
}

/// Every unresolved edit of one assistant turn
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditSet {
    visible: Vec<Edit>,
    backlog: Vec<Edit>,
}

impl EditSet {
    pub fn visible(&self) -> &[Edit] {
        &self.visible
    }

    pub fn backlog(&self) -> &[Edit] {
        &self.backlog
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty() && self.backlog.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edit> {
        self.visible.iter().chain(self.backlog.iter())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Edit> {
        self.visible.iter_mut().chain(self.backlog.iter_mut())
    }

    pub fn get(&self, id: EditId) -> Option<&Edit> {
        self.iter().find(|edit| edit.id == id)
    }

    pub fn is_visible(&self, id: EditId) -> bool {
        self.visible.iter().any(|edit| edit.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: EditId) -> Option<&mut Edit> {
        self.iter_mut().find(|edit| edit.id == id)
    }

    /// Remove an edit wherever it lives
    pub(crate) fn remove(&mut self, id: EditId) -> Option<Edit> {
        if let Some(index) = self.visible.iter().position(|edit| edit.id == id) {
            return Some(self.visible.remove(index));
        }
        let index = self.backlog.iter().position(|edit| edit.id == id)?;
        Some(self.backlog.remove(index))
    }

    /// Remove every edit matching `predicate`, preserving order of the rest
    pub(crate) fn extract_if(&mut self, mut predicate: impl FnMut(&Edit) -> bool) -> Vec<Edit> {
        let mut removed = Vec::new();
        for list in [&mut self.visible, &mut self.backlog] {
            let (drop, keep): (Vec<Edit>, Vec<Edit>) =
                std::mem::take(list).into_iter().partition(|edit| predicate(edit));
            *list = keep;
            removed.extend(drop);
        }
        removed
    }

    pub fn pending_count(&self) -> usize {
        self.iter().filter(|edit| edit.is_pending()).count()
    }
}

/// Owns one [`EditSet`] and pages it into the UI
#[derive(Debug, Clone)]
pub struct SuggestionQueue {
    set: EditSet,
    batch_size: usize,
    events: Vec<QueueEvent>,
}

impl Default for SuggestionQueue {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl SuggestionQueue {
    /// Create an empty queue; a batch size of 0 is treated as 1
    pub fn new(batch_size: usize) -> Self {
        Self {
            set: EditSet::default(),
            batch_size: batch_size.max(1),
            events: Vec::new(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Replace the whole set; the first batch becomes visible, the rest waits
    pub fn ingest(&mut self, edits: Vec<Edit>) {
        let total = edits.len();
        let mut visible = edits;
        let backlog = visible.split_off(total.min(self.batch_size));
        self.set = EditSet { visible, backlog };

        if !self.set.backlog.is_empty() {
            self.events.push(QueueEvent::ShowingFirst {
                shown: self.set.visible.len(),
                total,
            });
        }
        log::debug!(
            target: "edit_suggest::queue",
            "Ingested {} edit(s): {} visible, {} in backlog",
            total,
            self.set.visible.len(),
            self.set.backlog.len()
        );
    }

    /// Drop every edit, visible or not
    pub fn clear(&mut self) {
        self.set = EditSet::default();
    }

    pub fn edit_set(&self) -> &EditSet {
        &self.set
    }

    pub(crate) fn edit_set_mut(&mut self) -> &mut EditSet {
        &mut self.set
    }

    pub fn visible_batch(&self) -> &[Edit] {
        self.set.visible()
    }

    pub fn backlog(&self) -> &[Edit] {
        self.set.backlog()
    }

    /// Pending edits across the visible batch and the full backlog
    pub fn pending_count(&self) -> usize {
        self.set.pending_count()
    }

    pub fn is_resolved(&self) -> bool {
        self.set.is_empty()
    }

    /// True once no visible edit is still pending
    pub fn batch_drained(&self) -> bool {
        !self.set.visible.iter().any(Edit::is_pending)
    }

    /// Replace the visible batch with the next edits from the backlog.
    ///
    /// Promoted edits are reset to pending. With an empty backlog the set is
    /// fully resolved and the visible batch is emptied.
    pub fn advance(&mut self) -> usize {
        let take = self.set.backlog.len().min(self.batch_size);
        let mut promoted: Vec<Edit> = self.set.backlog.drain(..take).collect();
        for edit in &mut promoted {
            edit.status = EditStatus::Pending;
        }
        self.set.visible = promoted;

        if take == 0 {
            self.events.push(QueueEvent::AllResolved);
        } else {
            self.events.push(QueueEvent::MoreSuggestionsReady {
                count: take,
                remaining: self.set.backlog.len(),
            });
        }
        take
    }

    /// Advance if the visible batch has nothing left to decide.
    ///
    /// Returns whether the queue advanced.
    pub fn advance_if_drained(&mut self) -> bool {
        if !self.batch_drained() {
            return false;
        }
        self.advance();
        true
    }

    pub(crate) fn push_event(&mut self, event: QueueEvent) {
        self.events.push(event);
    }

    /// Take all notifications raised since the last call
    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edits(n: usize) -> Vec<Edit> {
        (1..=n)
            .map(|line| Edit::from_parts(line, 1, format!("line {line}"), "").unwrap())
            .collect()
    }

    fn resolve_visible(queue: &mut SuggestionQueue) {
        let ids: Vec<EditId> = queue.visible_batch().iter().map(|e| e.id).collect();
        for id in ids {
            queue.edit_set_mut().remove(id);
        }
    }

    #[test]
    fn ingest_splits_into_batch_and_backlog() {
        let mut queue = SuggestionQueue::default();
        let input = edits(12);
        let first_ids: Vec<EditId> = input.iter().take(5).map(|e| e.id).collect();

        queue.ingest(input);

        assert_eq!(queue.visible_batch().len(), 5);
        assert_eq!(queue.backlog().len(), 7);
        let visible_ids: Vec<EditId> = queue.visible_batch().iter().map(|e| e.id).collect();
        assert_eq!(visible_ids, first_ids);
        assert_eq!(queue.pending_count(), 12);
        assert_eq!(
            queue.take_events(),
            vec![QueueEvent::ShowingFirst { shown: 5, total: 12 }]
        );
    }

    #[test]
    fn advance_promotes_next_batch() {
        let mut queue = SuggestionQueue::default();
        queue.ingest(edits(12));
        queue.take_events();

        resolve_visible(&mut queue);
        assert_eq!(queue.advance(), 5);

        assert_eq!(queue.visible_batch().len(), 5);
        assert_eq!(queue.backlog().len(), 2);
        assert_eq!(
            queue.take_events(),
            vec![QueueEvent::MoreSuggestionsReady { count: 5, remaining: 2 }]
        );
    }

    #[test]
    fn advance_resets_status_to_pending() {
        let mut queue = SuggestionQueue::new(2);
        queue.ingest(edits(3));
        queue.edit_set_mut().backlog[0].status = EditStatus::Rejected;

        resolve_visible(&mut queue);
        queue.advance();

        assert!(queue.visible_batch()[0].is_pending());
    }

    #[test]
    fn advance_on_empty_backlog_resolves_set() {
        let mut queue = SuggestionQueue::default();
        queue.ingest(edits(3));
        resolve_visible(&mut queue);

        assert_eq!(queue.advance(), 0);
        assert!(queue.is_resolved());
        assert_eq!(queue.take_events(), vec![QueueEvent::AllResolved]);
    }

    #[test]
    fn advance_if_drained_waits_for_pending_edits() {
        let mut queue = SuggestionQueue::default();
        queue.ingest(edits(7));
        queue.take_events();

        assert!(!queue.advance_if_drained());

        for edit in queue.edit_set_mut().visible.iter_mut() {
            edit.status = EditStatus::Accepted;
        }
        assert!(queue.advance_if_drained());
        assert_eq!(queue.visible_batch().len(), 2);
        assert!(queue.backlog().is_empty());
    }

    #[test]
    fn pending_count_ignores_resolved_edits() {
        let mut queue = SuggestionQueue::default();
        queue.ingest(edits(6));
        queue.edit_set_mut().visible[0].status = EditStatus::Accepted;
        assert_eq!(queue.pending_count(), 5);
    }

    #[test]
    fn small_ingest_raises_no_notice() {
        let mut queue = SuggestionQueue::default();
        queue.ingest(edits(5));
        assert!(queue.backlog().is_empty());
        assert!(queue.take_events().is_empty());
    }

    #[test]
    fn empty_ingest_clears_everything() {
        let mut queue = SuggestionQueue::default();
        queue.ingest(edits(9));
        queue.ingest(Vec::new());
        assert!(queue.visible_batch().is_empty());
        assert!(queue.backlog().is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn extract_if_preserves_order_of_survivors() {
        let mut set = EditSet {
            visible: edits(4),
            backlog: edits(2),
        };
        let removed = set.extract_if(|edit| edit.start_line() % 2 == 0);
        assert_eq!(removed.len(), 3);
        let left: Vec<usize> = set.iter().map(Edit::start_line).collect();
        assert_eq!(left, vec![1, 3, 1]);
    }
}

//! Triage queue shared by the report and task-log review screens.
//!
//! Items keep their canonical order. The active pointer only ever rests on a
//! pending item and walks the pending subsequence; decisions are terminal.

use crate::models::types::ReviewStatus;
use serde::Deserialize;

pub trait Reviewable {
    fn review_id(&self) -> &str;
    fn review_status(&self) -> ReviewStatus;
    fn set_review_status(&mut self, status: ReviewStatus);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "prev")]
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageKey {
    Approve,
    Reject,
    Previous,
    Next,
}

impl TriageKey {
    /// Keyboard shortcuts: A approves, R rejects, arrows navigate.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "a" | "A" => Some(TriageKey::Approve),
            "r" | "R" => Some(TriageKey::Reject),
            "ArrowLeft" => Some(TriageKey::Previous),
            "ArrowRight" => Some(TriageKey::Next),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    Decided { id: String, status: ReviewStatus },
    Moved { id: String },
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ReviewQueue<T> {
    items: Vec<T>,
    selected: Vec<String>,
    active: Option<String>,
}

impl<T: Reviewable> ReviewQueue<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut queue = ReviewQueue {
            items,
            selected: Vec::new(),
            active: None,
        };
        queue.active = queue.pending_ids().into_iter().next();
        queue
    }

    /// Points at `id` when it is a pending item; otherwise keeps the default.
    pub fn with_active(mut self, id: Option<&str>) -> Self {
        if let Some(id) = id {
            self.activate(id);
        }
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn pending(&self) -> Vec<&T> {
        self.items
            .iter()
            .filter(|item| item.review_status() == ReviewStatus::Pending)
            .collect()
    }

    fn pending_ids(&self) -> Vec<String> {
        self.pending()
            .into_iter()
            .map(|item| item.review_id().to_string())
            .collect()
    }

    fn is_pending(&self, id: &str) -> bool {
        self.items
            .iter()
            .any(|item| item.review_id() == id && item.review_status() == ReviewStatus::Pending)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn activate(&mut self, id: &str) -> bool {
        if self.is_pending(id) {
            self.active = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Index of the active item within the pending subsequence.
    pub fn position(&self) -> Option<usize> {
        let id = self.active.as_deref()?;
        self.pending().iter().position(|item| item.review_id() == id)
    }

    pub fn can_navigate(&self, direction: Direction) -> bool {
        match (self.position(), direction) {
            (Some(index), Direction::Previous) => index > 0,
            (Some(index), Direction::Next) => index + 1 < self.pending().len(),
            (None, _) => false,
        }
    }

    pub fn navigate(&mut self, direction: Direction) -> bool {
        if !self.can_navigate(direction) {
            return false;
        }
        let pending = self.pending_ids();
        let index = match self.position() {
            Some(index) => index,
            None => return false,
        };
        let target = match direction {
            Direction::Previous => index - 1,
            Direction::Next => index + 1,
        };
        self.active = pending.get(target).cloned();
        true
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn toggle_select(&mut self, id: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            return true;
        }
        if self.is_pending(id) {
            self.selected.push(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn toggle_select_all(&mut self) {
        let pending = self.pending_ids();
        if !pending.is_empty() && self.selected.len() == pending.len() {
            self.selected.clear();
        } else {
            self.selected = pending;
        }
    }

    /// Moves each pending id in `ids` to `status`. Returns the ids that changed,
    /// in queue order. Unknown and already-decided ids are ignored.
    pub fn decide(&mut self, ids: &[String], status: ReviewStatus) -> Vec<String> {
        if status == ReviewStatus::Pending {
            return Vec::new();
        }
        let anchor = self.position();
        let mut changed = Vec::new();
        for item in self.items.iter_mut() {
            if item.review_status() == ReviewStatus::Pending
                && ids.iter().any(|id| id == item.review_id())
            {
                item.set_review_status(status);
                changed.push(item.review_id().to_string());
            }
        }
        self.selected.clear();

        let active_decided = self
            .active
            .as_deref()
            .map(|id| !self.is_pending(id))
            .unwrap_or(false);
        if active_decided {
            let pending = self.pending_ids();
            self.active = match anchor {
                Some(index) if index < pending.len() => pending.get(index).cloned(),
                _ => pending.last().cloned(),
            };
        }
        changed
    }

    pub fn decide_selected(&mut self, status: ReviewStatus) -> Vec<String> {
        let ids = self.selected.clone();
        self.decide(&ids, status)
    }

    pub fn triage(&mut self, key: TriageKey) -> TriageOutcome {
        let active = match self.active.clone() {
            Some(id) => id,
            None => return TriageOutcome::Unchanged,
        };
        let status = match key {
            TriageKey::Approve => ReviewStatus::Verified,
            TriageKey::Reject => ReviewStatus::Rejected,
            TriageKey::Previous | TriageKey::Next => {
                let direction = if key == TriageKey::Previous {
                    Direction::Previous
                } else {
                    Direction::Next
                };
                return if self.navigate(direction) {
                    TriageOutcome::Moved {
                        id: self.active.clone().unwrap_or_default(),
                    }
                } else {
                    TriageOutcome::Unchanged
                };
            }
        };
        if self.decide(&[active.clone()], status).is_empty() {
            TriageOutcome::Unchanged
        } else {
            TriageOutcome::Decided { id: active, status }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        id: String,
        status: ReviewStatus,
    }

    impl Reviewable for Item {
        fn review_id(&self) -> &str {
            &self.id
        }
        fn review_status(&self) -> ReviewStatus {
            self.status
        }
        fn set_review_status(&mut self, status: ReviewStatus) {
            self.status = status;
        }
    }

    fn queue(statuses: &[ReviewStatus]) -> ReviewQueue<Item> {
        ReviewQueue::new(
            statuses
                .iter()
                .enumerate()
                .map(|(i, status)| Item {
                    id: format!("{}", i + 1),
                    status: *status,
                })
                .collect(),
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    use crate::models::types::ReviewStatus::{Pending, Rejected, Verified};

    #[test]
    fn test_next_three_times_reaches_last_and_disables_next() {
        let mut q = queue(&[Pending, Pending, Pending, Pending]);
        assert_eq!(q.active_id(), Some("1"));
        assert!(!q.can_navigate(Direction::Previous));
        for _ in 0..3 {
            assert!(q.navigate(Direction::Next));
        }
        assert_eq!(q.active_id(), Some("4"));
        assert!(!q.can_navigate(Direction::Next));
        assert!(!q.navigate(Direction::Next));
        assert_eq!(q.active_id(), Some("4"));
    }

    #[test]
    fn test_navigation_skips_decided_items() {
        let mut q = queue(&[Pending, Verified, Pending, Rejected, Pending]);
        assert!(q.navigate(Direction::Next));
        assert_eq!(q.active_id(), Some("3"));
        assert!(q.navigate(Direction::Next));
        assert_eq!(q.active_id(), Some("5"));
        assert!(q.navigate(Direction::Previous));
        assert_eq!(q.active_id(), Some("3"));
    }

    #[test]
    fn test_verifying_active_advances_pointer() {
        let mut q = queue(&[Pending, Pending, Pending, Pending]);
        q.navigate(Direction::Next);
        let changed = q.decide(&ids(&["2"]), Verified);
        assert_eq!(changed, ids(&["2"]));
        assert_eq!(q.pending().len(), 3);
        assert_eq!(q.active_id(), Some("3"));
    }

    #[test]
    fn test_verifying_last_active_falls_back_then_empties() {
        let mut q = queue(&[Pending, Pending]);
        q.navigate(Direction::Next);
        q.decide(&ids(&["2"]), Verified);
        assert_eq!(q.active_id(), Some("1"));
        q.decide(&ids(&["1"]), Rejected);
        assert_eq!(q.active_id(), None);
        assert!(!q.can_navigate(Direction::Next));
        assert_eq!(q.triage(TriageKey::Approve), TriageOutcome::Unchanged);
    }

    #[test]
    fn test_bulk_verify_changes_exactly_selected() {
        let mut q = queue(&[Pending, Pending, Pending, Pending, Pending]);
        q.toggle_select("2");
        q.toggle_select("4");
        q.toggle_select("5");
        let changed = q.decide_selected(Verified);
        assert_eq!(changed, ids(&["2", "4", "5"]));
        let statuses: Vec<ReviewStatus> = q.items().iter().map(|i| i.status).collect();
        assert_eq!(statuses, vec![Pending, Verified, Pending, Verified, Verified]);
        assert!(q.selected().is_empty());
    }

    #[test]
    fn test_decisions_are_terminal() {
        let mut q = queue(&[Rejected, Pending]);
        let changed = q.decide(&ids(&["1", "2", "9"]), Verified);
        assert_eq!(changed, ids(&["2"]));
        assert_eq!(q.items()[0].status, Rejected);
        assert!(q.decide(&ids(&["2"]), Rejected).is_empty());
        assert_eq!(q.items()[1].status, Verified);
    }

    #[test]
    fn test_select_all_toggles() {
        let mut q = queue(&[Pending, Verified, Pending]);
        q.toggle_select_all();
        assert_eq!(q.selected(), ids(&["1", "3"]).as_slice());
        q.toggle_select_all();
        assert!(q.selected().is_empty());
        assert!(!q.toggle_select("2"));
    }

    #[test]
    fn test_triage_keys() {
        assert_eq!(TriageKey::from_key("A"), Some(TriageKey::Approve));
        assert_eq!(TriageKey::from_key("r"), Some(TriageKey::Reject));
        assert_eq!(TriageKey::from_key("ArrowRight"), Some(TriageKey::Next));
        assert_eq!(TriageKey::from_key("x"), None);

        let mut q = queue(&[Pending, Pending, Pending]);
        assert_eq!(
            q.triage(TriageKey::Next),
            TriageOutcome::Moved { id: "2".into() }
        );
        assert_eq!(
            q.triage(TriageKey::Reject),
            TriageOutcome::Decided {
                id: "2".into(),
                status: Rejected
            }
        );
        assert_eq!(q.active_id(), Some("3"));
        assert_eq!(q.triage(TriageKey::Next), TriageOutcome::Unchanged);
    }

    #[test]
    fn test_with_active_ignores_decided_ids() {
        let q = queue(&[Verified, Pending, Pending]).with_active(Some("1"));
        assert_eq!(q.active_id(), Some("2"));
        let q = queue(&[Verified, Pending, Pending]).with_active(Some("3"));
        assert_eq!(q.active_id(), Some("3"));
    }
}

//! Store-backed driver for [`ReviewQueue`]. Each request rebuilds the queue
//! from the store, applies one operation and writes back the changed rows.

use crate::db::Db;
use crate::error::AppError;
use crate::models::review::*;
use crate::models::types::ReviewStatus;
use crate::review_queue::{Direction, ReviewQueue, Reviewable, TriageKey, TriageOutcome};
use rusqlite::Connection;

/// A table of reviewable entries.
pub trait ReviewSource {
    type Item: Reviewable + Clone;

    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    /// All entries in canonical (insertion) order.
    fn load(conn: &Connection) -> Result<Vec<Self::Item>, AppError>;

    /// Persists a decision already applied to `item`, with its side effects.
    fn apply(conn: &Connection, item: &Self::Item) -> Result<(), AppError>;
}

fn snapshot<T: Reviewable + Clone>(queue: &ReviewQueue<T>, message: Option<String>) -> QueueView<T> {
    QueueView {
        items: queue.items().to_vec(),
        pending_count: queue.pending().len(),
        active_id: queue.active_id().map(str::to_string),
        has_previous: queue.can_navigate(Direction::Previous),
        has_next: queue.can_navigate(Direction::Next),
        message,
    }
}

fn describe<S: ReviewSource>(count: usize, status: ReviewStatus) -> String {
    let noun = if count == 1 { S::SINGULAR } else { S::PLURAL };
    format!("{} {} {}", count, noun, status)
}

pub fn show<S: ReviewSource>(db: &Db, query: &QueueQuery) -> Result<QueueView<S::Item>, AppError> {
    let items = db.with_conn(S::load)?;
    let mut queue = ReviewQueue::new(items).with_active(query.active.as_deref());
    if let Some(direction) = query.direction {
        queue.navigate(direction);
    }
    Ok(snapshot(&queue, None))
}

fn persist<S: ReviewSource>(
    conn: &Connection,
    queue: &ReviewQueue<S::Item>,
    changed: &[String],
) -> Result<(), AppError> {
    for item in queue.items() {
        if changed.iter().any(|id| id == item.review_id()) {
            S::apply(conn, item)?;
        }
    }
    Ok(())
}

/// Entries covered by a bulk decision.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    Ids(&'a [String]),
    AllPending,
}

fn select<T: Reviewable>(queue: &mut ReviewQueue<T>, selection: Selection<'_>) {
    match selection {
        Selection::Ids(ids) => {
            for id in ids {
                if !queue.selected().contains(id) {
                    queue.toggle_select(id);
                }
            }
        }
        Selection::AllPending => queue.toggle_select_all(),
    }
}

fn decide_in<S: ReviewSource>(
    conn: &Connection,
    items: Vec<S::Item>,
    selection: Selection<'_>,
    status: ReviewStatus,
    active: Option<&str>,
) -> Result<(QueueView<S::Item>, usize), AppError> {
    let mut queue = ReviewQueue::new(items).with_active(active);
    select(&mut queue, selection);
    let changed = queue.decide_selected(status);
    persist::<S>(conn, &queue, &changed)?;
    Ok((snapshot(&queue, Some(describe::<S>(changed.len(), status))), changed.len()))
}

fn ensure_decision(status: ReviewStatus) -> Result<(), AppError> {
    if status == ReviewStatus::Pending {
        return Err(AppError::BadRequest("Decision must be verified or rejected".into()));
    }
    Ok(())
}

/// Decides every pending entry in `selection`. Already decided and unknown
/// ids are skipped; an empty change set is not an error.
pub fn decide<S: ReviewSource>(
    db: &Db,
    selection: Selection<'_>,
    status: ReviewStatus,
    active: Option<&str>,
) -> Result<QueueView<S::Item>, AppError> {
    ensure_decision(status)?;
    let (view, count) =
        db.with_tx(|conn| decide_in::<S>(conn, S::load(conn)?, selection, status, active))?;
    tracing::info!(kind = S::PLURAL, status = %status, count, "review decision");
    Ok(view)
}

/// Single-entry decision that reports a conflict when the entry is no longer
/// pending. The check and the change share one transaction.
pub fn decide_one<S: ReviewSource>(
    db: &Db,
    id: &str,
    status: ReviewStatus,
    active: Option<&str>,
) -> Result<QueueView<S::Item>, AppError> {
    ensure_decision(status)?;
    let (view, count) = db.with_tx(|conn| {
        let items = S::load(conn)?;
        let current = items
            .iter()
            .find(|item| item.review_id() == id)
            .map(|item| item.review_status());
        match current {
            None => Err(AppError::NotFound(format!("{} not found", capitalize(S::SINGULAR)))),
            Some(ReviewStatus::Pending) => {
                let ids = [id.to_string()];
                decide_in::<S>(conn, items, Selection::Ids(&ids), status, active.or(Some(id)))
            }
            Some(done) => Err(AppError::Conflict(format!(
                "{} has already been {}",
                capitalize(S::SINGULAR),
                done
            ))),
        }
    })?;
    tracing::info!(kind = S::PLURAL, status = %status, count, id, "review decision");
    Ok(view)
}

/// Keyboard triage on the active entry. Unknown keys leave the queue as is.
pub fn triage<S: ReviewSource>(
    db: &Db,
    req: &TriageRequest,
) -> Result<QueueView<S::Item>, AppError> {
    let key = TriageKey::from_key(&req.key);
    let (view, outcome) = db.with_tx(|conn| {
        let mut queue = ReviewQueue::new(S::load(conn)?).with_active(req.active.as_deref());
        let outcome = match key {
            Some(key) => queue.triage(key),
            None => TriageOutcome::Unchanged,
        };
        let message = match &outcome {
            TriageOutcome::Decided { id, status } => {
                persist::<S>(conn, &queue, std::slice::from_ref(id))?;
                Some(describe::<S>(1, *status))
            }
            TriageOutcome::Moved { .. } | TriageOutcome::Unchanged => None,
        };
        Ok((snapshot(&queue, message), outcome))
    })?;
    if let TriageOutcome::Decided { id, status } = &outcome {
        tracing::info!(kind = S::PLURAL, id = %id, status = %status, "triage decision");
    }
    Ok(view)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("task log"), "Task log");
        assert_eq!(capitalize(""), "");
    }
}

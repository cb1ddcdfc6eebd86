use crate::review_queue::Direction;
use serde::{Deserialize, Serialize};

/// Snapshot of a review queue after an operation.
#[derive(Debug, Serialize)]
pub struct QueueView<T> {
    pub items: Vec<T>,
    pub pending_count: usize,
    pub active_id: Option<String>,
    pub has_previous: bool,
    pub has_next: bool,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueueQuery {
    pub active: Option<String>,
    pub direction: Option<Direction>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkDecisionRequest {
    #[serde(default)]
    pub ids: Vec<String>,
    /// Decide every pending entry; `ids` is ignored.
    #[serde(default)]
    pub select_all: bool,
    pub active: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub active: Option<String>,
    pub key: String,
}

use super::schedule::ScheduleView;
use super::types::{DebrisType, ReviewStatus};
use crate::review_queue::Reviewable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct TaskLogView {
    pub id: String,
    pub schedule_id: String,
    pub schedule_location: Option<String>,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub collected_weight: f64,
    pub verified_weight: f64,
    pub estimated_weight: Option<f64>,
    pub variance_percent: Option<i64>,
    pub high_variance: bool,
    pub status: ReviewStatus,
    pub debris_type: DebrisType,
    pub notes: String,
    pub photos: Vec<String>,
    pub completed_at: String,
}

impl Reviewable for TaskLogView {
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

#[derive(Debug, Deserialize)]
pub struct TaskCompletionRequest {
    pub collected_weight: f64,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub debris_type: Option<DebrisType>,
}

#[derive(Debug, Deserialize)]
pub struct TaskLogEdit {
    pub collected_weight: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImpactStats {
    pub total_verified_weight: f64,
    pub report_count: i64,
    pub next_badge_weight: Option<f64>,
    pub badge_progress: f64,
    pub ai_accuracy: i64,
    pub completed_tasks: usize,
    pub pending_verification: usize,
}

#[derive(Debug, Serialize)]
pub struct TaskHistory {
    pub logs: Vec<TaskLogView>,
    pub impact: ImpactStats,
}

#[derive(Debug, Serialize)]
pub struct TaskDetails {
    pub schedule: ScheduleView,
    pub countdown: String,
    pub days_until: i64,
    pub distance_km: Option<f64>,
    pub is_assigned: bool,
}

#[derive(Debug, Serialize)]
pub struct TaskCompletionResult {
    pub log: TaskLogView,
    pub message: String,
}

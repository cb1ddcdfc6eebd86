use super::types::{CaptureStep, DebrisType, Quantity, ReviewStatus};
use crate::capture::Classification;
use crate::review_queue::Reviewable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct DebrisReport {
    pub id: String,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub photo_ref: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub debris_type: DebrisType,
    pub quantity: Quantity,
    pub confidence: i64,
    pub low_confidence: bool,
    pub status: ReviewStatus,
    pub offline_sync: bool,
    pub created_at: String,
}

impl Reviewable for DebrisReport {
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
pub struct CaptureRequest {
    /// Reuses a session that was sent back to the camera by a retake.
    pub session_id: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub location: String,
    /// base64 encoded image
    pub photo: Option<String>,
    #[serde(default)]
    pub offline_sync: bool,
}

#[derive(Debug, Serialize)]
pub struct CaptureSession {
    pub id: String,
    pub step: CaptureStep,
    pub classification: Option<Classification>,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub quantity: Quantity,
}

#[derive(Debug, Serialize)]
pub struct SubmitReportResult {
    pub report: DebrisReport,
    pub xp_awarded: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReportHistory {
    pub reports: Vec<DebrisReport>,
    pub verified: usize,
    pub pending: usize,
    pub rejected: usize,
}

use super::task_log::TaskLogView;
use super::types::{RegistrationStatus, VolunteerStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Volunteer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub preferred_location: String,
    pub proximity_km: Option<f64>,
    pub total_verified_weight: f64,
    pub report_count: i64,
    pub reports_verified: i64,
    pub reports_rejected: i64,
    pub ai_accuracy: i64,
    pub xp: i64,
    pub previous_rank: Option<i64>,
    pub status: VolunteerStatus,
    pub last_active_at: String,
    pub joined_at: String,
}

#[derive(Debug, Deserialize)]
pub struct VolunteerRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub preferred_location: String,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResult {
    pub id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VolunteerQuery {
    pub q: Option<String>,
    pub status: Option<VolunteerStatus>,
}

#[derive(Debug, Serialize)]
pub struct VolunteerHistory {
    pub volunteer: Volunteer,
    pub badges: Vec<String>,
    pub total_collected_weight: f64,
    pub verified_task_count: usize,
    pub logs: Vec<TaskLogView>,
}

#[derive(Debug, Serialize)]
pub struct ProfileStats {
    pub total_verified_weight: f64,
    pub total_reports: i64,
    pub verified_reports: i64,
    pub unverified_reports: i64,
    pub ai_accuracy: i64,
    pub xp: i64,
    pub rank: usize,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub preferred_location: String,
    pub joined_at: String,
    pub badges: Vec<String>,
    pub next_badge_weight: Option<f64>,
    pub stats: ProfileStats,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatorRegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub contact_number: String,
    pub organization: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub job_scope: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorRegistration {
    pub id: String,
    pub username: String,
    pub email: String,
    pub contact_number: String,
    pub organization: String,
    pub department: String,
    pub job_scope: String,
    pub status: RegistrationStatus,
    pub submitted_at: String,
    pub decided_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationQuery {
    pub status: Option<RegistrationStatus>,
}

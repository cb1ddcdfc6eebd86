use super::types::{DebrisType, Priority, ScheduleStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub id: String,
    pub location: String,
    pub scheduled_at: String,
    pub priority: Priority,
    pub debris_target_type: DebrisType,
    pub estimated_quantity: f64,
    pub required_volunteers: i64,
    pub assigned_volunteers: Vec<String>,
    pub understaffed: bool,
    pub status: ScheduleStatus,
    pub hotspot_id: Option<String>,
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleForm {
    #[serde(default)]
    pub location: String,
    pub scheduled_at: String,
    pub priority: Option<Priority>,
    pub debris_target_type: DebrisType,
    #[serde(default)]
    pub estimated_quantity: f64,
    pub required_volunteers: Option<i64>,
    pub status: Option<ScheduleStatus>,
    pub hotspot_id: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduleList {
    pub upcoming: Vec<ScheduleView>,
    pub completed: Vec<ScheduleView>,
    pub cancelled: Vec<ScheduleView>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentToggle {
    pub schedule: ScheduleView,
    pub volunteer_id: String,
    pub assigned: bool,
}

#[derive(Debug, Serialize)]
pub struct AutoAssignResult {
    pub schedule: ScheduleView,
    pub assigned: Vec<String>,
    pub message: String,
}

use super::leaderboard::LeaderboardEntry;
use super::schedule::ScheduleView;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct VolunteerDashboard {
    pub volunteer_id: String,
    pub name: String,
    pub xp: i64,
    pub rank: usize,
    pub upcoming_tasks: Vec<ScheduleView>,
    pub unread_notifications: usize,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
pub struct CoordinatorDashboard {
    pub today_reports: i64,
    pub verified_weight: f64,
    pub tasks_completed: i64,
    pub active_volunteers: i64,
    pub pending_reports: i64,
    pub pending_task_logs: i64,
    pub pending_registrations: i64,
    pub upcoming_schedules: Vec<ScheduleView>,
}

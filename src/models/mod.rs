pub mod dashboard;
pub mod hotspot;
pub mod leaderboard;
pub mod notification;
pub mod report;
pub mod review;
pub mod schedule;
pub mod settings;
pub mod task_log;
pub mod types;
pub mod volunteer;

pub mod dashboard;
pub mod hotspots;
pub mod leaderboard;
pub mod notifications;
pub mod password;
pub mod registrations;
pub mod reports;
pub mod review;
pub mod schedules;
pub mod settings;
pub mod task_logs;
pub mod volunteers;

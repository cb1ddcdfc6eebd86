use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub volunteer_id: String,
    pub name: String,
    pub verified_weight: f64,
    pub xp: i64,
    pub ai_accuracy: i64,
    pub badges: Vec<String>,
    pub rank_change: i64,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    pub current: Option<LeaderboardEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RewardRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RewardResult {
    pub volunteer_id: String,
    pub notification_id: String,
    pub message: String,
}

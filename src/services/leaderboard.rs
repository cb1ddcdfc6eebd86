use crate::db::Db;
use crate::error::AppError;
use crate::leaderboard;
use crate::models::leaderboard::*;
use crate::models::types::NotificationKind;
use crate::services::{notifications, volunteers};
use crate::validation;

const DEFAULT_LIMIT: i64 = 10;

pub fn standings(db: &Db) -> Result<Vec<LeaderboardEntry>, AppError> {
    Ok(leaderboard::rank(db.with_conn(volunteers::standings)?))
}

/// Top entries plus the caller's own row, wherever it ranks.
pub fn for_volunteer(db: &Db, volunteer_id: &str, limit: Option<i64>) -> Result<Leaderboard, AppError> {
    db.with_conn(|conn| volunteers::load(conn, volunteer_id))?;
    let mut entries = standings(db)?;
    let current = entries.iter().find(|e| e.volunteer_id == volunteer_id).cloned();
    entries.truncate(validation::clamp_limit(limit, DEFAULT_LIMIT) as usize);
    Ok(Leaderboard { entries, current })
}

pub fn for_coordinator(db: &Db, limit: Option<i64>) -> Result<Leaderboard, AppError> {
    let mut entries = standings(db)?;
    entries.truncate(validation::clamp_limit(limit, DEFAULT_LIMIT) as usize);
    Ok(Leaderboard {
        entries,
        current: None,
    })
}

/// Sends a reward notice. Fulfilment happens outside the system.
pub fn reward(db: &Db, volunteer_id: &str, req: RewardRequest) -> Result<RewardResult, AppError> {
    let (name, notification_id) = db.with_conn(|conn| {
        let volunteer = volunteers::load(conn, volunteer_id)?;
        let message = match req.message.trim() {
            "" => "Thank you for your outstanding contribution to our coasts!".to_string(),
            m => m.to_string(),
        };
        let id = notifications::push(conn, volunteer_id, NotificationKind::Reward, "Reward sent!", &message)?;
        Ok((volunteer.name, id))
    })?;
    tracing::info!(volunteer_id, notification_id = %notification_id, "reward sent");
    Ok(RewardResult {
        volunteer_id: volunteer_id.to_string(),
        notification_id,
        message: format!("Reward sent to {}", name),
    })
}

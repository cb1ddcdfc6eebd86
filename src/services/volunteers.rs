use crate::db::Db;
use crate::error::{not_found_on_empty, AppError};
use crate::leaderboard::{self, Standing};
use crate::models::types::{ReviewStatus, VolunteerStatus};
use crate::models::volunteer::*;
use crate::services::{password, task_logs};
use crate::validation;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const COLUMNS: &str = "id, name, email, preferred_location, proximity_km, total_verified_weight,
    report_count, reports_verified, reports_rejected, ai_accuracy, xp, previous_rank, status,
    last_active_at, joined_at";

fn from_row(row: &Row) -> rusqlite::Result<Volunteer> {
    Ok(Volunteer {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        preferred_location: row.get(3)?,
        proximity_km: row.get(4)?,
        total_verified_weight: row.get(5)?,
        report_count: row.get(6)?,
        reports_verified: row.get(7)?,
        reports_rejected: row.get(8)?,
        ai_accuracy: row.get(9)?,
        xp: row.get(10)?,
        previous_rank: row.get(11)?,
        status: row.get(12)?,
        last_active_at: row.get(13)?,
        joined_at: row.get(14)?,
    })
}

pub fn load(conn: &Connection, id: &str) -> Result<Volunteer, AppError> {
    conn.query_row(
        &format!("SELECT {} FROM volunteers WHERE id = ?1", COLUMNS),
        params![id],
        from_row,
    )
    .map_err(|e| not_found_on_empty(e, "Volunteer"))
}

/// Every volunteer in insertion order.
pub fn all(conn: &Connection) -> Result<Vec<Volunteer>, AppError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM volunteers ORDER BY rowid", COLUMNS))?;
    let rows = stmt.query_map([], from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn standings(conn: &Connection) -> Result<Vec<Standing>, AppError> {
    Ok(all(conn)?
        .into_iter()
        .map(|v| Standing {
            volunteer_id: v.id,
            name: v.name,
            verified_weight: v.total_verified_weight,
            xp: v.xp,
            ai_accuracy: v.ai_accuracy,
            report_count: v.report_count,
            previous_rank: v.previous_rank,
        })
        .collect())
}

/// 1-based leaderboard position of `volunteer_id`.
pub fn rank_of(conn: &Connection, volunteer_id: &str) -> Result<usize, AppError> {
    leaderboard::rank(standings(conn)?)
        .into_iter()
        .find(|e| e.volunteer_id == volunteer_id)
        .map(|e| e.rank)
        .ok_or_else(|| AppError::NotFound("Volunteer not found".into()))
}

pub fn get(db: &Db, id: &str) -> Result<Volunteer, AppError> {
    db.with_conn(|conn| load(conn, id))
}

pub fn register(db: &Db, req: VolunteerRegistration) -> Result<RegistrationResult, AppError> {
    let name = validation::validate_name(&req.name, "Full name")?;
    let email = validation::validate_email(&req.email)?;
    validation::validate_password(&req.password, &req.confirm_password)?;
    let location = req.preferred_location.trim().to_string();
    let hash = password::hash_password(&req.password);
    let id = Uuid::new_v4().to_string();

    db.with_conn(|conn| {
        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM volunteers WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(AppError::Conflict("Email is already registered".into()));
        }
        conn.execute(
            "INSERT INTO volunteers (id, name, email, password_hash, preferred_location)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, email, hash, location],
        )?;
        Ok(())
    })?;
    tracing::info!(volunteer_id = %id, "volunteer registered");

    Ok(RegistrationResult {
        id,
        status: VolunteerStatus::Active.to_string(),
        message: "Registration successful! Welcome to T-COAST.".into(),
    })
}

/// Case-insensitive search on name or preferred location, optionally
/// restricted to one status.
pub fn list(db: &Db, query: &VolunteerQuery) -> Result<Vec<Volunteer>, AppError> {
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());
    let volunteers = db.with_conn(all)?;
    Ok(volunteers
        .into_iter()
        .filter(|v| query.status.map_or(true, |s| v.status == s))
        .filter(|v| match &needle {
            Some(n) => {
                v.name.to_lowercase().contains(n.as_str())
                    || v.preferred_location.to_lowercase().contains(n.as_str())
            }
            None => true,
        })
        .collect())
}

pub fn history(db: &Db, id: &str) -> Result<VolunteerHistory, AppError> {
    let (volunteer, logs) = db.with_conn(|conn| {
        let volunteer = load(conn, id)?;
        let logs = task_logs::for_volunteer(conn, id)?;
        Ok((volunteer, logs))
    })?;
    let total_collected_weight = logs.iter().map(|l| l.collected_weight).sum();
    let verified_task_count = logs
        .iter()
        .filter(|l| l.status == ReviewStatus::Verified)
        .count();
    Ok(VolunteerHistory {
        badges: leaderboard::badges(
            volunteer.report_count,
            volunteer.total_verified_weight,
            volunteer.ai_accuracy,
        ),
        volunteer,
        total_collected_weight,
        verified_task_count,
        logs,
    })
}

pub fn profile(db: &Db, id: &str) -> Result<Profile, AppError> {
    let (v, rank) = db.with_conn(|conn| Ok((load(conn, id)?, rank_of(conn, id)?)))?;
    Ok(Profile {
        badges: leaderboard::badges(v.report_count, v.total_verified_weight, v.ai_accuracy),
        next_badge_weight: leaderboard::next_badge_weight(v.total_verified_weight),
        stats: ProfileStats {
            total_verified_weight: v.total_verified_weight,
            total_reports: v.report_count,
            verified_reports: v.reports_verified,
            unverified_reports: (v.report_count - v.reports_verified).max(0),
            ai_accuracy: v.ai_accuracy,
            xp: v.xp,
            rank,
        },
        id: v.id,
        name: v.name,
        email: v.email,
        preferred_location: v.preferred_location,
        joined_at: v.joined_at,
    })
}

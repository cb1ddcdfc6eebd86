use crate::db::Db;
use crate::error::AppError;
use crate::models::dashboard::*;
use crate::services::{leaderboard, notifications, registrations, schedules, volunteers};
use chrono::Utc;
use rusqlite::{params, Connection};

const DASHBOARD_TOP: usize = 5;

pub fn volunteer(db: &Db, volunteer_id: &str) -> Result<VolunteerDashboard, AppError> {
    let (v, rank, upcoming_tasks, unread_notifications) = db.with_conn(|conn| {
        Ok((
            volunteers::load(conn, volunteer_id)?,
            volunteers::rank_of(conn, volunteer_id)?,
            schedules::upcoming_for_volunteer(conn, volunteer_id)?,
            notifications::unread_count(conn, volunteer_id)?,
        ))
    })?;
    let mut top = leaderboard::standings(db)?;
    top.truncate(DASHBOARD_TOP);
    Ok(VolunteerDashboard {
        volunteer_id: v.id,
        name: v.name,
        xp: v.xp,
        rank,
        upcoming_tasks,
        unread_notifications,
        leaderboard: top,
    })
}

fn count(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<i64, AppError> {
    Ok(conn.query_row(sql, args, |row| row.get(0))?)
}

pub fn coordinator(db: &Db) -> Result<CoordinatorDashboard, AppError> {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    db.with_conn(|conn| {
        let verified_weight: f64 = conn.query_row(
            "SELECT COALESCE(SUM(total_verified_weight), 0) FROM volunteers",
            params![],
            |row| row.get(0),
        )?;
        Ok(CoordinatorDashboard {
            today_reports: count(
                conn,
                "SELECT COUNT(*) FROM debris_reports WHERE substr(created_at, 1, 10) = ?1",
                &[&today],
            )?,
            verified_weight,
            tasks_completed: count(conn, "SELECT COUNT(*) FROM task_logs WHERE status = 'verified'", &[])?,
            active_volunteers: count(conn, "SELECT COUNT(*) FROM volunteers WHERE status = 'active'", &[])?,
            pending_reports: count(conn, "SELECT COUNT(*) FROM debris_reports WHERE status = 'pending'", &[])?,
            pending_task_logs: count(conn, "SELECT COUNT(*) FROM task_logs WHERE status = 'pending'", &[])?,
            pending_registrations: registrations::pending_count(conn)?,
            upcoming_schedules: schedules::upcoming(conn)?,
        })
    })
}

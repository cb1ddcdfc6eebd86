use crate::db::Db;
use crate::error::{not_found_on_empty, AppError};
use crate::leaderboard;
use crate::models::review::{QueueQuery, QueueView, TriageRequest};
use crate::models::task_log::*;
use crate::models::types::{NotificationKind, ReviewStatus, ScheduleStatus};
use crate::services::review::{self, ReviewSource};
use crate::services::{notifications, schedules, volunteers};
use crate::validation;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const HIGH_VARIANCE_PERCENT: i64 = 50;

const SELECT: &str = "SELECT l.id, l.schedule_id, s.location, l.volunteer_id,
        COALESCE(v.name, l.volunteer_id), l.collected_weight, l.verified_weight,
        s.estimated_quantity,
        (SELECT COUNT(*) FROM schedule_volunteers sv WHERE sv.schedule_id = l.schedule_id),
        l.status, l.debris_type, l.notes, l.photos, l.completed_at
    FROM task_logs l
    LEFT JOIN schedules s ON s.id = l.schedule_id
    LEFT JOIN volunteers v ON v.id = l.volunteer_id";

/// Share of the schedule's estimate attributed to one volunteer.
pub fn estimated_share(estimated_quantity: f64, assigned: i64) -> f64 {
    estimated_quantity / assigned.max(1) as f64
}

/// Rounded percentage deviation from the estimate; `None` without one.
pub fn variance_percent(collected: f64, estimated: f64) -> Option<i64> {
    if estimated > 0.0 {
        Some(((collected - estimated).abs() / estimated * 100.0).round() as i64)
    } else {
        None
    }
}

fn from_row(row: &Row) -> rusqlite::Result<TaskLogView> {
    let collected_weight: f64 = row.get(5)?;
    let assigned: i64 = row.get(8)?;
    let estimated_weight = row
        .get::<_, Option<f64>>(7)?
        .map(|quantity| estimated_share(quantity, assigned));
    let variance = estimated_weight.and_then(|e| variance_percent(collected_weight, e));
    let photos: String = row.get(12)?;
    let photos: Vec<String> = serde_json::from_str(&photos)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e)))?;
    Ok(TaskLogView {
        id: row.get(0)?,
        schedule_id: row.get(1)?,
        schedule_location: row.get(2)?,
        volunteer_id: row.get(3)?,
        volunteer_name: row.get(4)?,
        collected_weight,
        verified_weight: row.get(6)?,
        estimated_weight,
        variance_percent: variance,
        high_variance: variance.map_or(false, |v| v > HIGH_VARIANCE_PERCENT),
        status: row.get(9)?,
        debris_type: row.get(10)?,
        notes: row.get(11)?,
        photos,
        completed_at: row.get(13)?,
    })
}

fn query(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<TaskLogView>, AppError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load(conn: &Connection, id: &str) -> Result<TaskLogView, AppError> {
    conn.query_row(&format!("{} WHERE l.id = ?1", SELECT), params![id], from_row)
        .map_err(|e| not_found_on_empty(e, "Task log"))
}

/// A volunteer's logs, newest first.
pub fn for_volunteer(conn: &Connection, volunteer_id: &str) -> Result<Vec<TaskLogView>, AppError> {
    query(
        conn,
        &format!(
            "{} WHERE l.volunteer_id = ?1 ORDER BY l.completed_at DESC, l.rowid DESC",
            SELECT
        ),
        &[&volunteer_id],
    )
}

pub struct TaskLogs;

impl ReviewSource for TaskLogs {
    type Item = TaskLogView;

    const SINGULAR: &'static str = "task log";
    const PLURAL: &'static str = "task logs";

    fn load(conn: &Connection) -> Result<Vec<TaskLogView>, AppError> {
        query(conn, &format!("{} ORDER BY l.rowid", SELECT), &[])
    }

    /// Verification credits the collected weight to the volunteer.
    fn apply(conn: &Connection, log: &TaskLogView) -> Result<(), AppError> {
        let verified_weight = match log.status {
            ReviewStatus::Verified => log.collected_weight,
            _ => 0.0,
        };
        conn.execute(
            "UPDATE task_logs SET status = ?2, verified_weight = ?3 WHERE id = ?1 AND status = 'pending'",
            params![log.id, log.status, verified_weight],
        )?;
        conn.execute(
            "UPDATE volunteers SET total_verified_weight = total_verified_weight + ?2 WHERE id = ?1",
            params![log.volunteer_id, verified_weight],
        )?;
        let location = log.schedule_location.as_deref().unwrap_or("your cleanup");
        let (title, message) = match log.status {
            ReviewStatus::Verified => (
                "Task Verified",
                format!("{} kg collected at {} was verified", log.collected_weight, location),
            ),
            _ => (
                "Task Rejected",
                format!("Your task log for {} was not accepted", location),
            ),
        };
        notifications::push(conn, &log.volunteer_id, NotificationKind::Review, title, &message)?;
        Ok(())
    }
}

pub fn queue(db: &Db, q: &QueueQuery) -> Result<QueueView<TaskLogView>, AppError> {
    review::show::<TaskLogs>(db, q)
}

pub fn decide(
    db: &Db,
    id: &str,
    status: ReviewStatus,
    active: Option<&str>,
) -> Result<QueueView<TaskLogView>, AppError> {
    review::decide_one::<TaskLogs>(db, id, status, active)
}

pub fn triage(db: &Db, req: &TriageRequest) -> Result<QueueView<TaskLogView>, AppError> {
    review::triage::<TaskLogs>(db, req)
}

/// Countdown label and whole days until `scheduled_at`, counted in calendar days.
pub fn countdown(scheduled_at: &str, now: DateTime<Utc>) -> (String, i64) {
    let days = DateTime::parse_from_rfc3339(scheduled_at)
        .map(|t| (t.with_timezone(&Utc).date_naive() - now.date_naive()).num_days())
        .unwrap_or(0);
    let label = match days {
        d if d <= 0 => "Today!".to_string(),
        1 => "Tomorrow".to_string(),
        d => format!("In {} days", d),
    };
    (label, days)
}

pub fn details(db: &Db, schedule_id: &str, volunteer_id: &str) -> Result<TaskDetails, AppError> {
    let (schedule, volunteer) = db.with_conn(|conn| {
        Ok((schedules::load(conn, schedule_id)?, volunteers::load(conn, volunteer_id)?))
    })?;
    let (countdown, days_until) = countdown(&schedule.scheduled_at, Utc::now());
    Ok(TaskDetails {
        is_assigned: schedule.assigned_volunteers.iter().any(|v| v == volunteer_id),
        schedule,
        countdown,
        days_until,
        distance_km: volunteer.proximity_km,
    })
}

pub fn complete(
    db: &Db,
    schedule_id: &str,
    volunteer_id: &str,
    req: TaskCompletionRequest,
) -> Result<TaskCompletionResult, AppError> {
    validation::validate_weight(req.collected_weight)?;
    let photos: Vec<String> = req
        .photos
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    validation::validate_photos(&photos)?;
    let id = Uuid::new_v4().to_string();

    let log = db.with_tx(|conn| {
        volunteers::load(conn, volunteer_id)?;
        let schedule = schedules::load(conn, schedule_id)?;
        if schedule.status == ScheduleStatus::Cancelled {
            return Err(AppError::Conflict("Cleanup has been cancelled".into()));
        }
        conn.execute(
            "INSERT INTO task_logs (id, schedule_id, volunteer_id, collected_weight, status,
                debris_type, notes, photos, completed_at)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, ?7, ?8)",
            params![
                id,
                schedule_id,
                volunteer_id,
                req.collected_weight,
                req.debris_type.unwrap_or(schedule.debris_target_type),
                req.notes.trim(),
                serde_json::to_string(&photos)?,
                validation::format_timestamp(Utc::now()),
            ],
        )?;
        load(conn, &id)
    })?;
    tracing::info!(log_id = %log.id, schedule_id, volunteer_id, weight = log.collected_weight, "task completion logged");
    Ok(TaskCompletionResult {
        log,
        message: "Task completion submitted for verification".into(),
    })
}

pub fn history(db: &Db, volunteer_id: &str) -> Result<TaskHistory, AppError> {
    let (volunteer, logs) = db.with_conn(|conn| {
        Ok((volunteers::load(conn, volunteer_id)?, for_volunteer(conn, volunteer_id)?))
    })?;
    let weight = volunteer.total_verified_weight;
    let impact = ImpactStats {
        total_verified_weight: weight,
        report_count: volunteer.report_count,
        next_badge_weight: leaderboard::next_badge_weight(weight),
        badge_progress: leaderboard::badge_progress(weight),
        ai_accuracy: volunteer.ai_accuracy,
        completed_tasks: logs.iter().filter(|l| l.status == ReviewStatus::Verified).count(),
        pending_verification: logs.iter().filter(|l| l.status == ReviewStatus::Pending).count(),
    };
    Ok(TaskHistory { logs, impact })
}

fn load_own_pending(conn: &Connection, volunteer_id: &str, log_id: &str) -> Result<TaskLogView, AppError> {
    let log = load(conn, log_id)?;
    if log.volunteer_id != volunteer_id {
        return Err(AppError::NotFound("Task log not found".into()));
    }
    if log.status != ReviewStatus::Pending {
        return Err(AppError::Conflict(format!(
            "Task log has already been {}",
            log.status
        )));
    }
    Ok(log)
}

pub fn edit(db: &Db, volunteer_id: &str, log_id: &str, req: TaskLogEdit) -> Result<TaskLogView, AppError> {
    if let Some(weight) = req.collected_weight {
        validation::validate_weight(weight)?;
    }
    let log = db.with_tx(|conn| {
        let current = load_own_pending(conn, volunteer_id, log_id)?;
        conn.execute(
            "UPDATE task_logs SET collected_weight = ?2, notes = ?3 WHERE id = ?1",
            params![
                log_id,
                req.collected_weight.unwrap_or(current.collected_weight),
                req.notes.as_deref().map(str::trim).unwrap_or(&current.notes),
            ],
        )?;
        load(conn, log_id)
    })?;
    tracing::info!(log_id, volunteer_id, "task log edited");
    Ok(log)
}

pub fn delete(db: &Db, volunteer_id: &str, log_id: &str) -> Result<(), AppError> {
    db.with_tx(|conn| {
        load_own_pending(conn, volunteer_id, log_id)?;
        conn.execute("DELETE FROM task_logs WHERE id = ?1", params![log_id])?;
        Ok(())
    })?;
    tracing::info!(log_id, volunteer_id, "task log deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::DebrisType;
    use crate::review_queue::Direction;
    use chrono::TimeZone;

    fn completion(weight: f64, photos: &[&str]) -> TaskCompletionRequest {
        TaskCompletionRequest {
            collected_weight: weight,
            photos: photos.iter().map(|p| p.to_string()).collect(),
            notes: " Lots of bottle caps ".into(),
            debris_type: None,
        }
    }

    #[test]
    fn test_variance() {
        assert_eq!(estimated_share(150.0, 3), 50.0);
        assert_eq!(estimated_share(200.0, 0), 200.0);
        assert_eq!(variance_percent(45.0, 50.0), Some(10));
        assert_eq!(variance_percent(12.0, 40.0), Some(70));
        assert_eq!(variance_percent(5.0, 0.0), None);
    }

    #[test]
    fn test_queue_views_flag_variance() {
        let db = Db::open_seeded().unwrap();
        let view = queue(&db, &QueueQuery::default()).unwrap();
        assert_eq!(view.pending_count, 4);
        assert_eq!(view.active_id.as_deref(), Some("l1"));
        assert!(!view.has_previous);
        assert!(view.has_next);
        let l1 = &view.items[0];
        assert_eq!(l1.estimated_weight, Some(50.0));
        assert!(!l1.high_variance);
        assert!(view.items[1].high_variance);
        assert_eq!(view.items[0].photos.len(), 2);
    }

    #[test]
    fn test_navigation_stops_at_last_pending() {
        let db = Db::open_seeded().unwrap();
        let mut active = None;
        for _ in 0..3 {
            let q = QueueQuery {
                active: active.clone(),
                direction: Some(Direction::Next),
            };
            active = queue(&db, &q).unwrap().active_id;
        }
        assert_eq!(active.as_deref(), Some("l4"));
        let q = QueueQuery {
            active: active.clone(),
            direction: Some(Direction::Next),
        };
        let view = queue(&db, &q).unwrap();
        assert_eq!(view.active_id.as_deref(), Some("l4"));
        assert!(!view.has_next);
    }

    #[test]
    fn test_verify_credits_weight_and_notifies() {
        let db = Db::open_seeded().unwrap();
        let view = decide(&db, "l1", ReviewStatus::Verified, None).unwrap();
        assert_eq!(view.active_id.as_deref(), Some("l2"));
        assert_eq!(view.pending_count, 3);
        assert_eq!(view.message.as_deref(), Some("1 task log verified"));
        let v1 = volunteers::get(&db, "v1").unwrap();
        assert_eq!(v1.total_verified_weight, 201.0);
        let l1 = db.with_conn(|conn| load(conn, "l1")).unwrap();
        assert_eq!(l1.verified_weight, 45.0);
        let feed = notifications::feed(&db, "v1").unwrap();
        assert_eq!(feed.today[0].title, "Task Verified");
    }

    #[test]
    fn test_second_decision_conflicts() {
        let db = Db::open_seeded().unwrap();
        decide(&db, "l2", ReviewStatus::Rejected, None).unwrap();
        assert!(matches!(
            decide(&db, "l2", ReviewStatus::Verified, None),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            decide(&db, "nope", ReviewStatus::Verified, None),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(volunteers::get(&db, "v2").unwrap().total_verified_weight, 234.0);
    }

    #[test]
    fn test_racing_decisions_yield_one_winner() {
        let db = std::sync::Arc::new(Db::open_seeded().unwrap());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || decide(&db, "l1", ReviewStatus::Verified, None))
            })
            .collect();
        let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AppError::Conflict(_))))
                .count(),
            7
        );
        assert_eq!(volunteers::get(&db, "v1").unwrap().total_verified_weight, 201.0);
    }

    #[test]
    fn test_triage_keys() {
        let db = Db::open_seeded().unwrap();
        let req = TriageRequest {
            active: Some("l2".into()),
            key: "r".into(),
        };
        let view = triage(&db, &req).unwrap();
        assert_eq!(view.active_id.as_deref(), Some("l3"));
        let req = TriageRequest {
            active: view.active_id.clone(),
            key: "ArrowLeft".into(),
        };
        assert_eq!(triage(&db, &req).unwrap().active_id.as_deref(), Some("l1"));
        let req = TriageRequest {
            active: Some("l1".into()),
            key: "x".into(),
        };
        let view = triage(&db, &req).unwrap();
        assert_eq!(view.pending_count, 3);
        assert!(view.message.is_none());
    }

    #[test]
    fn test_countdown_labels() {
        let now = Utc.with_ymd_and_hms(2024, 12, 9, 20, 0, 0).unwrap();
        assert_eq!(countdown("2024-12-09T23:00:00Z", now).0, "Today!");
        assert_eq!(countdown("2024-12-10T08:00:00Z", now).0, "Tomorrow");
        assert_eq!(countdown("2024-12-14T08:00:00Z", now), ("In 5 days".to_string(), 5));
        assert_eq!(countdown("2024-12-01T08:00:00Z", now).0, "Today!");
    }

    #[test]
    fn test_details() {
        let db = Db::open_seeded().unwrap();
        let d = details(&db, "s1", "v1").unwrap();
        assert!(d.is_assigned);
        assert_eq!(d.countdown, "Tomorrow");
        assert_eq!(d.distance_km, Some(2.3));
        assert!(!details(&db, "s3", "v1").unwrap().is_assigned);
    }

    #[test]
    fn test_complete_validates_and_records() {
        let db = Db::open_seeded().unwrap();
        assert!(matches!(
            complete(&db, "s1", "v1", completion(0.0, &["/a.jpg"])),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            complete(&db, "s1", "v1", completion(10.0, &[" "])),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            complete(&db, "s9", "v1", completion(10.0, &["/a.jpg"])),
            Err(AppError::NotFound(_))
        ));
        let done = complete(&db, "s1", "v1", completion(30.0, &["/a.jpg"])).unwrap();
        assert_eq!(done.log.status, ReviewStatus::Pending);
        assert_eq!(done.log.debris_type, DebrisType::Plastic);
        assert_eq!(done.log.notes, "Lots of bottle caps");
        assert_eq!(history(&db, "v1").unwrap().logs[0].id, done.log.id);
    }

    #[test]
    fn test_complete_rejects_cancelled_schedule() {
        let db = Db::open_seeded().unwrap();
        db.with_conn(|conn| {
            conn.execute("UPDATE schedules SET status = 'cancelled' WHERE id = 's2'", [])?;
            Ok(())
        })
        .unwrap();
        assert!(matches!(
            complete(&db, "s2", "v4", completion(5.0, &["/a.jpg"])),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_history_impact() {
        let db = Db::open_seeded().unwrap();
        let h = history(&db, "v1").unwrap();
        assert_eq!(h.logs.len(), 2);
        assert_eq!(h.impact.completed_tasks, 1);
        assert_eq!(h.impact.pending_verification, 1);
        assert_eq!(h.impact.next_badge_weight, Some(200.0));
        assert!((h.impact.badge_progress - 78.0).abs() < 1e-9);
    }

    #[test]
    fn test_edit_and_delete_only_own_pending() {
        let db = Db::open_seeded().unwrap();
        let edit_req = || TaskLogEdit {
            collected_weight: Some(50.0),
            notes: None,
        };
        let edited = edit(&db, "v1", "l1", edit_req()).unwrap();
        assert_eq!(edited.collected_weight, 50.0);
        assert_eq!(edited.notes, "Mostly plastic bottles found near shoreline");
        assert!(matches!(edit(&db, "v1", "l5", edit_req()), Err(AppError::Conflict(_))));
        assert!(matches!(edit(&db, "v2", "l1", edit_req()), Err(AppError::NotFound(_))));
        assert!(matches!(delete(&db, "v1", "l5"), Err(AppError::Conflict(_))));
        delete(&db, "v1", "l1").unwrap();
        assert_eq!(history(&db, "v1").unwrap().logs.len(), 1);
    }
}

use crate::assignment::{self, Candidate};
use crate::db::Db;
use crate::error::{not_found_on_empty, AppError};
use crate::models::schedule::*;
use crate::models::types::{NotificationKind, Priority, ScheduleStatus};
use crate::services::{notifications, volunteers};
use crate::validation;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const DEFAULT_REQUIRED_VOLUNTEERS: i64 = 5;

const COLUMNS: &str = "id, location, scheduled_at, priority, debris_target_type, estimated_quantity,
    required_volunteers, status, hotspot_id, notes, created_at";

fn from_row(row: &Row) -> rusqlite::Result<ScheduleView> {
    Ok(ScheduleView {
        id: row.get(0)?,
        location: row.get(1)?,
        scheduled_at: row.get(2)?,
        priority: row.get(3)?,
        debris_target_type: row.get(4)?,
        estimated_quantity: row.get(5)?,
        required_volunteers: row.get(6)?,
        assigned_volunteers: Vec::new(),
        understaffed: false,
        status: row.get(7)?,
        hotspot_id: row.get(8)?,
        notes: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Assigned volunteer ids in assignment order.
pub fn assigned(conn: &Connection, schedule_id: &str) -> Result<Vec<String>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT volunteer_id FROM schedule_volunteers WHERE schedule_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![schedule_id], |row| row.get(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn with_assignments(conn: &Connection, mut view: ScheduleView) -> Result<ScheduleView, AppError> {
    view.assigned_volunteers = assigned(conn, &view.id)?;
    view.understaffed = (view.assigned_volunteers.len() as i64) < view.required_volunteers;
    Ok(view)
}

pub fn load(conn: &Connection, id: &str) -> Result<ScheduleView, AppError> {
    let view = conn
        .query_row(
            &format!("SELECT {} FROM schedules WHERE id = ?1", COLUMNS),
            params![id],
            from_row,
        )
        .map_err(|e| not_found_on_empty(e, "Schedule"))?;
    with_assignments(conn, view)
}

fn query_views(
    conn: &Connection,
    sql: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<ScheduleView>, AppError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(with_assignments(conn, row?)?);
    }
    Ok(out)
}

/// Upcoming schedules, soonest first.
pub fn upcoming(conn: &Connection) -> Result<Vec<ScheduleView>, AppError> {
    query_views(
        conn,
        &format!(
            "SELECT {} FROM schedules WHERE status = 'upcoming' ORDER BY scheduled_at, rowid",
            COLUMNS
        ),
        &[],
    )
}

pub fn upcoming_for_volunteer(
    conn: &Connection,
    volunteer_id: &str,
) -> Result<Vec<ScheduleView>, AppError> {
    query_views(
        conn,
        &format!(
            "SELECT {} FROM schedules WHERE status = 'upcoming' AND id IN
                (SELECT schedule_id FROM schedule_volunteers WHERE volunteer_id = ?1)
             ORDER BY scheduled_at, rowid",
            COLUMNS
        ),
        &[&volunteer_id],
    )
}

pub fn list(db: &Db) -> Result<ScheduleList, AppError> {
    let all = db.with_conn(|conn| {
        query_views(
            conn,
            &format!("SELECT {} FROM schedules ORDER BY created_at DESC, rowid DESC", COLUMNS),
            &[],
        )
    })?;
    let mut list = ScheduleList {
        upcoming: Vec::new(),
        completed: Vec::new(),
        cancelled: Vec::new(),
    };
    for view in all {
        match view.status {
            ScheduleStatus::Upcoming => list.upcoming.push(view),
            ScheduleStatus::Completed => list.completed.push(view),
            ScheduleStatus::Cancelled => list.cancelled.push(view),
        }
    }
    Ok(list)
}

struct ValidForm {
    location: String,
    scheduled_at: String,
    estimated_quantity: f64,
    hotspot_id: Option<String>,
    notes: String,
}

/// Shared checks for create and update. A hotspot fills in the location.
fn validate_form(conn: &Connection, form: &ScheduleForm) -> Result<ValidForm, AppError> {
    let hotspot_id = form
        .hotspot_id
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string);
    let location = match &hotspot_id {
        Some(h) => conn
            .query_row("SELECT name FROM hotspots WHERE id = ?1", params![h], |row| {
                row.get::<_, String>(0)
            })
            .map_err(|e| not_found_on_empty(e, "Hotspot"))?,
        None => validation::validate_name(&form.location, "Location")?,
    };
    let scheduled_at = validation::parse_scheduled_at(&form.scheduled_at)?;
    validation::validate_estimated_quantity(form.estimated_quantity)?;
    if let Some(required) = form.required_volunteers {
        validation::validate_required_volunteers(required)?;
    }
    Ok(ValidForm {
        location,
        scheduled_at: validation::format_timestamp(scheduled_at),
        estimated_quantity: form.estimated_quantity,
        hotspot_id,
        notes: form.notes.trim().to_string(),
    })
}

pub fn create(db: &Db, form: ScheduleForm) -> Result<ScheduleView, AppError> {
    let id = Uuid::new_v4().to_string();
    let view = db.with_conn(|conn| {
        let valid = validate_form(conn, &form)?;
        conn.execute(
            "INSERT INTO schedules (id, location, scheduled_at, priority, debris_target_type,
                estimated_quantity, required_volunteers, status, hotspot_id, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                id,
                valid.location,
                valid.scheduled_at,
                form.priority.unwrap_or(Priority::Medium),
                form.debris_target_type,
                valid.estimated_quantity,
                form.required_volunteers.unwrap_or(DEFAULT_REQUIRED_VOLUNTEERS),
                form.status.unwrap_or(ScheduleStatus::Upcoming),
                valid.hotspot_id,
                valid.notes,
                validation::format_timestamp(chrono::Utc::now()),
            ],
        )?;
        load(conn, &id)
    })?;
    tracing::info!(schedule_id = %view.id, location = %view.location, "schedule created");
    Ok(view)
}

/// Replaces the editable fields; omitted priority, headcount and status keep
/// their stored values.
pub fn update(db: &Db, id: &str, form: ScheduleForm) -> Result<ScheduleView, AppError> {
    let view = db.with_conn(|conn| {
        let current = load(conn, id)?;
        let valid = validate_form(conn, &form)?;
        conn.execute(
            "UPDATE schedules SET location = ?2, scheduled_at = ?3, priority = ?4,
                debris_target_type = ?5, estimated_quantity = ?6, required_volunteers = ?7,
                status = ?8, hotspot_id = ?9, notes = ?10
             WHERE id = ?1",
            params![
                id,
                valid.location,
                valid.scheduled_at,
                form.priority.unwrap_or(current.priority),
                form.debris_target_type,
                valid.estimated_quantity,
                form.required_volunteers.unwrap_or(current.required_volunteers),
                form.status.unwrap_or(current.status),
                valid.hotspot_id,
                valid.notes,
            ],
        )?;
        load(conn, id)
    })?;
    tracing::info!(schedule_id = %id, status = %view.status, "schedule updated");
    Ok(view)
}

pub fn delete(db: &Db, id: &str) -> Result<(), AppError> {
    let deleted =
        db.with_conn(|conn| Ok(conn.execute("DELETE FROM schedules WHERE id = ?1", params![id])?))?;
    if deleted == 0 {
        return Err(AppError::NotFound("Schedule not found".into()));
    }
    tracing::info!(schedule_id = %id, "schedule deleted");
    Ok(())
}

/// Assigns the volunteer when absent and unassigns when present. Staffing
/// limits are not enforced; the view only flags understaffing.
pub fn toggle_volunteer(
    db: &Db,
    schedule_id: &str,
    volunteer_id: &str,
) -> Result<AssignmentToggle, AppError> {
    let (schedule, is_assigned) = db.with_tx(|conn| {
        volunteers::load(conn, volunteer_id)?;
        let mut current = load(conn, schedule_id)?.assigned_volunteers;
        let is_assigned = assignment::toggle(&mut current, volunteer_id);
        if is_assigned {
            conn.execute(
                "INSERT INTO schedule_volunteers (schedule_id, volunteer_id) VALUES (?1, ?2)",
                params![schedule_id, volunteer_id],
            )?;
        } else {
            conn.execute(
                "DELETE FROM schedule_volunteers WHERE schedule_id = ?1 AND volunteer_id = ?2",
                params![schedule_id, volunteer_id],
            )?;
        }
        Ok((load(conn, schedule_id)?, is_assigned))
    })?;
    tracing::info!(schedule_id, volunteer_id, assigned = is_assigned, "assignment toggled");
    Ok(AssignmentToggle {
        schedule,
        volunteer_id: volunteer_id.to_string(),
        assigned: is_assigned,
    })
}

/// Fills the open slots with the nearest unassigned volunteers. Volunteers
/// without a known distance go last.
pub fn auto_assign(db: &Db, schedule_id: &str) -> Result<AutoAssignResult, AppError> {
    let (schedule, picked) = db.with_tx(|conn| {
        let schedule = load(conn, schedule_id)?;
        let candidates: Vec<Candidate> = volunteers::all(conn)?
            .into_iter()
            .map(|v| Candidate {
                volunteer_id: v.id,
                proximity_km: v.proximity_km.unwrap_or(f64::NAN),
            })
            .collect();
        let picked = assignment::pick_nearest(
            &candidates,
            &schedule.assigned_volunteers,
            schedule.required_volunteers,
        );
        for volunteer_id in &picked {
            conn.execute(
                "INSERT INTO schedule_volunteers (schedule_id, volunteer_id) VALUES (?1, ?2)",
                params![schedule_id, volunteer_id],
            )?;
            notifications::push(
                conn,
                volunteer_id,
                NotificationKind::Task,
                "New Task Assigned",
                &format!("You have been assigned to the {} cleanup", schedule.location),
            )?;
        }
        Ok((load(conn, schedule_id)?, picked))
    })?;
    tracing::info!(schedule_id, count = picked.len(), "volunteers auto-assigned");
    Ok(AutoAssignResult {
        message: format!("{} volunteers auto-assigned", picked.len()),
        schedule,
        assigned: picked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::DebrisType;

    fn form(location: &str) -> ScheduleForm {
        ScheduleForm {
            location: location.into(),
            scheduled_at: "2030-01-15T08:00".into(),
            priority: None,
            debris_target_type: DebrisType::Plastic,
            estimated_quantity: 60.0,
            required_volunteers: None,
            status: None,
            hotspot_id: None,
            notes: String::new(),
        }
    }

    #[test]
    fn test_list_partitions_newest_first() {
        let db = Db::open_seeded().unwrap();
        let list = list(&db).unwrap();
        let upcoming: Vec<&str> = list.upcoming.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(upcoming, vec!["s1", "s2", "s3"]);
        assert_eq!(list.completed.len(), 1);
        assert!(list.cancelled.is_empty());
        assert!(list.upcoming[0].understaffed);
        assert_eq!(list.upcoming[0].assigned_volunteers, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn test_create_defaults_and_prepends() {
        let db = Db::open_seeded().unwrap();
        let created = create(&db, form("Teluk Ketapang")).unwrap();
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.required_volunteers, 5);
        assert_eq!(created.scheduled_at, "2030-01-15T08:00:00Z");
        assert!(created.understaffed);
        assert_eq!(list(&db).unwrap().upcoming[0].id, created.id);
    }

    #[test]
    fn test_create_requires_location_unless_hotspot() {
        let db = Db::open_seeded().unwrap();
        assert!(matches!(create(&db, form("  ")), Err(AppError::BadRequest(_))));
        let mut f = form("");
        f.hotspot_id = Some("h4".into());
        assert_eq!(create(&db, f).unwrap().location, "Dungun Coast");
        let mut f = form("");
        f.hotspot_id = Some("h9".into());
        assert!(matches!(create(&db, f), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_keeps_omitted_fields() {
        let db = Db::open_seeded().unwrap();
        let mut f = form("Seberang Takir");
        f.status = Some(ScheduleStatus::Cancelled);
        let updated = update(&db, "s1", f).unwrap();
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.required_volunteers, 10);
        assert_eq!(updated.status, ScheduleStatus::Cancelled);
        assert_eq!(list(&db).unwrap().cancelled.len(), 1);
        assert!(matches!(update(&db, "nope", form("x")), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_delete_cascades_assignments() {
        let db = Db::open_seeded().unwrap();
        delete(&db, "s2").unwrap();
        let left: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM schedule_volunteers WHERE schedule_id = 's2'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(left, 0);
        assert!(matches!(delete(&db, "s2"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_toggle_volunteer() {
        let db = Db::open_seeded().unwrap();
        let on = toggle_volunteer(&db, "s3", "v6").unwrap();
        assert!(on.assigned);
        assert_eq!(on.schedule.assigned_volunteers, vec!["v6"]);
        let off = toggle_volunteer(&db, "s3", "v6").unwrap();
        assert!(!off.assigned);
        assert!(off.schedule.assigned_volunteers.is_empty());
        assert!(matches!(toggle_volunteer(&db, "s3", "v99"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_auto_assign_fills_with_nearest() {
        let db = Db::open_seeded().unwrap();
        let mut f = form("Kuala Abang");
        f.required_volunteers = Some(2);
        let created = create(&db, f).unwrap();
        let result = auto_assign(&db, &created.id).unwrap();
        assert_eq!(result.assigned, vec!["v5", "v2"]);
        assert_eq!(result.message, "2 volunteers auto-assigned");
        assert!(!result.schedule.understaffed);

        let again = auto_assign(&db, &created.id).unwrap();
        assert!(again.assigned.is_empty());
        assert_eq!(again.message, "0 volunteers auto-assigned");
    }

    #[test]
    fn test_auto_assign_notifies_and_respects_existing() {
        let db = Db::open_seeded().unwrap();
        // s1 needs 10 and has v1, v2, v3; only three others exist
        let result = auto_assign(&db, "s1").unwrap();
        assert_eq!(result.assigned, vec!["v5", "v4", "v6"]);
        assert_eq!(result.schedule.assigned_volunteers.len(), 6);
        let feed = notifications::feed(&db, "v5").unwrap();
        assert_eq!(feed.unread_count, 1);
        assert_eq!(feed.today[0].title, "New Task Assigned");
    }
}

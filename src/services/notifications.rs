use crate::db::Db;
use crate::error::AppError;
use crate::models::notification::*;
use crate::models::types::NotificationKind;
use crate::validation::format_timestamp;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

/// Queues a notification for a volunteer. Delivery is out of scope; the
/// record is what the notification screen reads.
pub fn push(
    conn: &Connection,
    volunteer_id: &str,
    kind: NotificationKind,
    title: &str,
    message: &str,
) -> Result<String, AppError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO notifications (id, volunteer_id, kind, title, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, volunteer_id, kind, title, message, format_timestamp(Utc::now())],
    )?;
    tracing::debug!(volunteer_id, kind = %kind, title, "notification queued");
    Ok(id)
}

pub fn unread_count(conn: &Connection, volunteer_id: &str) -> Result<usize, AppError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE volunteer_id = ?1 AND is_read = 0",
        params![volunteer_id],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

fn is_recent(created_at: &str, now: DateTime<Utc>) -> bool {
    DateTime::parse_from_rfc3339(created_at)
        .map(|t| now.signed_duration_since(t.with_timezone(&Utc)) < Duration::hours(24))
        .unwrap_or(false)
}

pub fn feed(db: &Db, volunteer_id: &str) -> Result<NotificationFeed, AppError> {
    let all = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, kind, title, message, is_read, created_at FROM notifications
             WHERE volunteer_id = ?1 ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt.query_map(params![volunteer_id], |row| {
            Ok(Notification {
                id: row.get(0)?,
                kind: row.get(1)?,
                title: row.get(2)?,
                message: row.get(3)?,
                is_read: row.get::<_, i64>(4)? != 0,
                created_at: row.get(5)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })?;

    let now = Utc::now();
    let unread_count = all.iter().filter(|n| !n.is_read).count();
    let (today, earlier): (Vec<Notification>, Vec<Notification>) =
        all.into_iter().partition(|n| is_recent(&n.created_at, now));
    Ok(NotificationFeed {
        unread_count,
        today,
        earlier,
    })
}

pub fn mark_read(db: &Db, volunteer_id: &str, id: &str) -> Result<MarkReadResult, AppError> {
    let updated = db.with_conn(|conn| {
        Ok(conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND volunteer_id = ?2",
            params![id, volunteer_id],
        )?)
    })?;
    if updated == 0 {
        return Err(AppError::NotFound("Notification not found".into()));
    }
    Ok(MarkReadResult { updated })
}

pub fn mark_all_read(db: &Db, volunteer_id: &str) -> Result<MarkReadResult, AppError> {
    let updated = db.with_conn(|conn| {
        Ok(conn.execute(
            "UPDATE notifications SET is_read = 1 WHERE volunteer_id = ?1 AND is_read = 0",
            params![volunteer_id],
        )?)
    })?;
    tracing::info!(volunteer_id, updated, "notifications marked read");
    Ok(MarkReadResult { updated })
}

pub fn delete(db: &Db, volunteer_id: &str, id: &str) -> Result<(), AppError> {
    let deleted = db.with_conn(|conn| {
        Ok(conn.execute(
            "DELETE FROM notifications WHERE id = ?1 AND volunteer_id = ?2",
            params![id, volunteer_id],
        )?)
    })?;
    if deleted == 0 {
        return Err(AppError::NotFound("Notification not found".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_groups_by_age() {
        let db = Db::open_seeded().unwrap();
        let feed = feed(&db, "v1").unwrap();
        assert_eq!(feed.unread_count, 2);
        assert_eq!(feed.today.len(), 3);
        assert_eq!(feed.earlier.len(), 3);
        assert_eq!(feed.today[0].id, "n1");
    }

    #[test]
    fn test_mark_all_read_then_delete() {
        let db = Db::open_seeded().unwrap();
        assert_eq!(mark_all_read(&db, "v1").unwrap().updated, 2);
        assert_eq!(feed(&db, "v1").unwrap().unread_count, 0);
        delete(&db, "v1", "n3").unwrap();
        assert!(matches!(delete(&db, "v1", "n3"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_notifications_are_scoped_to_owner() {
        let db = Db::open_seeded().unwrap();
        assert!(matches!(mark_read(&db, "v2", "n1"), Err(AppError::NotFound(_))));
        mark_read(&db, "v1", "n1").unwrap();
        assert_eq!(feed(&db, "v1").unwrap().unread_count, 1);
    }

    #[test]
    fn test_push_appears_first() {
        let db = Db::open_seeded().unwrap();
        db.with_conn(|conn| push(conn, "v1", NotificationKind::Reward, "Reward sent!", "Thanks"))
            .unwrap();
        let feed = feed(&db, "v1").unwrap();
        assert_eq!(feed.today[0].title, "Reward sent!");
        assert_eq!(feed.unread_count, 3);
    }
}

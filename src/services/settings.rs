use crate::db::Db;
use crate::error::AppError;
use crate::models::settings::*;
use crate::validation;
use rusqlite::{params, Connection, OptionalExtension};

/// Account id used for the coordinator console.
pub const COORDINATOR_ACCOUNT: &str = "coordinator";

fn load(conn: &Connection, account_id: &str) -> Result<Settings, AppError> {
    let stored = conn
        .query_row(
            "SELECT dark_mode, notifications, email_notifications, quiet_hours, auto_assign,
                report_summary, language
             FROM settings WHERE account_id = ?1",
            params![account_id],
            |row| {
                Ok(Settings {
                    dark_mode: row.get(0)?,
                    notifications: row.get(1)?,
                    email_notifications: row.get(2)?,
                    quiet_hours: row.get(3)?,
                    auto_assign: row.get(4)?,
                    report_summary: row.get(5)?,
                    language: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(stored.unwrap_or_default())
}

pub fn get(db: &Db, account_id: &str) -> Result<Settings, AppError> {
    db.with_conn(|conn| load(conn, account_id))
}

pub fn update(db: &Db, account_id: &str, patch: SettingsPatch) -> Result<Settings, AppError> {
    let language = patch
        .language
        .as_deref()
        .map(validation::validate_language)
        .transpose()?;
    let settings = db.with_tx(|conn| {
        let mut s = load(conn, account_id)?;
        s.dark_mode = patch.dark_mode.unwrap_or(s.dark_mode);
        s.notifications = patch.notifications.unwrap_or(s.notifications);
        s.email_notifications = patch.email_notifications.unwrap_or(s.email_notifications);
        s.quiet_hours = patch.quiet_hours.unwrap_or(s.quiet_hours);
        s.auto_assign = patch.auto_assign.unwrap_or(s.auto_assign);
        s.report_summary = patch.report_summary.unwrap_or(s.report_summary);
        if let Some(language) = language {
            s.language = language;
        }
        conn.execute(
            "INSERT INTO settings (account_id, dark_mode, notifications, email_notifications,
                quiet_hours, auto_assign, report_summary, language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(account_id) DO UPDATE SET
                dark_mode = excluded.dark_mode,
                notifications = excluded.notifications,
                email_notifications = excluded.email_notifications,
                quiet_hours = excluded.quiet_hours,
                auto_assign = excluded.auto_assign,
                report_summary = excluded.report_summary,
                language = excluded.language",
            params![
                account_id,
                s.dark_mode,
                s.notifications,
                s.email_notifications,
                s.quiet_hours,
                s.auto_assign,
                s.report_summary,
                s.language,
            ],
        )?;
        Ok(s)
    })?;
    tracing::info!(account_id, "settings updated");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_row() {
        let db = Db::open_in_memory().unwrap();
        assert_eq!(get(&db, "v1").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_update() {
        let db = Db::open_in_memory().unwrap();
        let patch = SettingsPatch {
            dark_mode: Some(true),
            language: Some("MS".into()),
            ..Default::default()
        };
        let s = update(&db, COORDINATOR_ACCOUNT, patch).unwrap();
        assert!(s.dark_mode);
        assert!(s.notifications);
        assert_eq!(s.language, "ms");

        let patch = SettingsPatch {
            quiet_hours: Some(true),
            ..Default::default()
        };
        let s = update(&db, COORDINATOR_ACCOUNT, patch).unwrap();
        assert!(s.dark_mode && s.quiet_hours);
        assert_eq!(get(&db, "v1").unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_language() {
        let db = Db::open_in_memory().unwrap();
        let patch = SettingsPatch {
            language: Some("fr".into()),
            ..Default::default()
        };
        assert!(matches!(update(&db, "v1", patch), Err(AppError::BadRequest(_))));
    }
}

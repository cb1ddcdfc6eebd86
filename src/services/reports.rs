use crate::capture::{CaptureFlow, Classification, Classifier};
use crate::db::Db;
use crate::error::{not_found_on_empty, AppError};
use crate::leaderboard;
use crate::models::report::*;
use crate::models::review::{BulkDecisionRequest, QueueQuery, QueueView, TriageRequest};
use crate::models::types::{CaptureStep, DebrisType, NotificationKind, ReviewStatus};
use crate::services::review::{self, ReviewSource, Selection};
use crate::services::{notifications, volunteers};
use crate::validation;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::time::Duration;
use uuid::Uuid;

pub const REPORT_XP: i64 = 10;
const LOW_CONFIDENCE: i64 = 70;

const SELECT: &str = "SELECT r.id, r.volunteer_id, COALESCE(v.name, r.volunteer_id),
        r.photo IS NOT NULL, r.latitude, r.longitude, r.location, r.debris_type, r.quantity,
        r.confidence, r.status, r.offline_sync, r.created_at
    FROM debris_reports r
    LEFT JOIN volunteers v ON v.id = r.volunteer_id";

pub fn photo_ref(report_id: &str) -> String {
    format!("/api/volunteer/reports/{}/photo", report_id)
}

fn from_row(row: &Row) -> rusqlite::Result<DebrisReport> {
    let id: String = row.get(0)?;
    let has_photo: bool = row.get(3)?;
    let confidence: i64 = row.get(9)?;
    Ok(DebrisReport {
        photo_ref: has_photo.then(|| photo_ref(&id)),
        id,
        volunteer_id: row.get(1)?,
        volunteer_name: row.get(2)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        location: row.get(6)?,
        debris_type: row.get(7)?,
        quantity: row.get(8)?,
        confidence,
        low_confidence: confidence < LOW_CONFIDENCE,
        status: row.get(10)?,
        offline_sync: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn query(conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<DebrisReport>, AppError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn load(conn: &Connection, id: &str) -> Result<DebrisReport, AppError> {
    conn.query_row(&format!("{} WHERE r.id = ?1", SELECT), params![id], from_row)
        .map_err(|e| not_found_on_empty(e, "Report"))
}

// capture sessions

/// Capture sessions not touched by a new photo for this long are dropped.
const SESSION_TTL_MINUTES: i64 = 60;

struct StoredSession {
    volunteer_id: String,
    flow: CaptureFlow,
    photo: Option<Vec<u8>>,
    latitude: f64,
    longitude: f64,
    location: String,
    offline_sync: bool,
    classify_started_at: Option<String>,
}

impl StoredSession {
    fn view(&self, id: &str) -> CaptureSession {
        CaptureSession {
            id: id.to_string(),
            step: self.flow.step(),
            classification: self.flow.classification(),
            latitude: self.latitude,
            longitude: self.longitude,
            location: self.location.clone(),
        }
    }

    fn classification_due(&self, latency: Duration, now: DateTime<Utc>) -> bool {
        if self.flow.step() != CaptureStep::Classifying {
            return false;
        }
        let started = self
            .classify_started_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|d| d.with_timezone(&Utc));
        match (started, chrono::Duration::from_std(latency)) {
            (Some(started), Ok(latency)) => started + latency <= now,
            _ => true,
        }
    }
}

fn session_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn load_session(conn: &Connection, volunteer_id: &str, id: &str) -> Result<StoredSession, AppError> {
    let session = conn
        .query_row(
            "SELECT volunteer_id, step, debris_type, confidence, photo, latitude, longitude,
                location, offline_sync, classify_started_at
             FROM capture_sessions WHERE id = ?1",
            params![id],
            |row| {
                let step: CaptureStep = row.get(1)?;
                let debris_type: Option<DebrisType> = row.get(2)?;
                let confidence: Option<i64> = row.get(3)?;
                let classification = match (debris_type, confidence) {
                    (Some(debris_type), Some(c)) => Some(Classification {
                        debris_type,
                        confidence: c.clamp(0, 100) as u8,
                    }),
                    _ => None,
                };
                Ok(StoredSession {
                    volunteer_id: row.get(0)?,
                    flow: CaptureFlow::restore(step, classification),
                    photo: row.get(4)?,
                    latitude: row.get(5)?,
                    longitude: row.get(6)?,
                    location: row.get(7)?,
                    offline_sync: row.get(8)?,
                    classify_started_at: row.get(9)?,
                })
            },
        )
        .map_err(|e| not_found_on_empty(e, "Capture session"))?;
    if session.volunteer_id != volunteer_id {
        return Err(AppError::NotFound("Capture session not found".into()));
    }
    Ok(session)
}

fn save_session(conn: &Connection, id: &str, session: &StoredSession) -> Result<(), AppError> {
    let classification = session.flow.classification();
    conn.execute(
        "UPDATE capture_sessions SET step = ?2, debris_type = ?3, confidence = ?4, photo = ?5,
            latitude = ?6, longitude = ?7, location = ?8, offline_sync = ?9,
            classify_started_at = ?10
         WHERE id = ?1",
        params![
            id,
            session.flow.step(),
            classification.map(|c| c.debris_type),
            classification.map(|c| c.confidence as i64),
            session.photo,
            session.latitude,
            session.longitude,
            session.location,
            session.offline_sync,
            session.classify_started_at,
        ],
    )?;
    Ok(())
}

fn classify(
    conn: &Connection,
    id: &str,
    session: &mut StoredSession,
    classifier: &dyn Classifier,
) -> Result<(), AppError> {
    let result = classifier.classify(session.photo.as_deref());
    session.flow.classified(result)?;
    save_session(conn, id, session)?;
    tracing::info!(session_id = id, debris_type = %result.debris_type, confidence = result.confidence, "photo classified");
    Ok(())
}

/// Attaches the classification to a session whose classifier latency has
/// run out, whether or not the capturing request is still waiting.
fn settle(
    conn: &Connection,
    id: &str,
    session: &mut StoredSession,
    classifier: &dyn Classifier,
) -> Result<(), AppError> {
    if session.classification_due(classifier.latency(), Utc::now()) {
        classify(conn, id, session, classifier)?;
    }
    Ok(())
}

/// Drops expired sessions of every volunteer. Returns how many went.
fn purge_expired(conn: &Connection, now: DateTime<Utc>) -> Result<usize, AppError> {
    let cutoff = session_timestamp(now - chrono::Duration::minutes(SESSION_TTL_MINUTES));
    Ok(conn.execute(
        "DELETE FROM capture_sessions WHERE COALESCE(classify_started_at, created_at) < ?1",
        params![cutoff],
    )?)
}

/// Takes the photo and moves the session to `classifying`. A new session is
/// opened unless `session_id` names one waiting at the camera; opening one
/// replaces any session the volunteer left behind.
pub fn begin_capture(db: &Db, volunteer_id: &str, req: CaptureRequest) -> Result<CaptureSession, AppError> {
    validation::validate_coordinates(req.latitude, req.longitude)?;
    let photo = validation::decode_photo(req.photo.as_deref())?;
    let location = req.location.trim().to_string();
    let now = Utc::now();

    let (session, purged) = db.with_tx(|conn| {
        volunteers::load(conn, volunteer_id)?;
        let mut purged = purge_expired(conn, now)?;
        let (id, mut session) = match &req.session_id {
            Some(id) => (id.clone(), load_session(conn, volunteer_id, id)?),
            None => {
                purged += conn.execute(
                    "DELETE FROM capture_sessions WHERE volunteer_id = ?1",
                    params![volunteer_id],
                )?;
                let id = Uuid::new_v4().to_string();
                conn.execute(
                    "INSERT INTO capture_sessions (id, volunteer_id, step, latitude, longitude)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![id, volunteer_id, CaptureStep::Camera, req.latitude, req.longitude],
                )?;
                let session = StoredSession {
                    volunteer_id: volunteer_id.to_string(),
                    flow: CaptureFlow::new(),
                    photo: None,
                    latitude: req.latitude,
                    longitude: req.longitude,
                    location: String::new(),
                    offline_sync: false,
                    classify_started_at: None,
                };
                (id, session)
            }
        };
        session.flow.capture()?;
        session.photo = photo;
        session.latitude = req.latitude;
        session.longitude = req.longitude;
        session.location = location;
        session.offline_sync = req.offline_sync;
        session.classify_started_at = Some(session_timestamp(now));
        save_session(conn, &id, &session)?;
        Ok((session.view(&id), purged))
    })?;
    if purged > 0 {
        tracing::debug!(purged, "stale capture sessions dropped");
    }
    tracing::info!(session_id = %session.id, volunteer_id, "photo captured, classifying");
    Ok(session)
}

/// Moves a `classifying` session to `confirm` now, without waiting for the
/// latency. A session already at `confirm` is returned as it is.
pub fn finish_capture(
    db: &Db,
    volunteer_id: &str,
    session_id: &str,
    classifier: &dyn Classifier,
) -> Result<CaptureSession, AppError> {
    db.with_conn(|conn| {
        let mut session = load_session(conn, volunteer_id, session_id)?;
        if session.flow.step() != CaptureStep::Confirm {
            classify(conn, session_id, &mut session, classifier)?;
        }
        Ok(session.view(session_id))
    })
}

pub fn get_session(
    db: &Db,
    volunteer_id: &str,
    session_id: &str,
    classifier: &dyn Classifier,
) -> Result<CaptureSession, AppError> {
    db.with_conn(|conn| {
        let mut session = load_session(conn, volunteer_id, session_id)?;
        settle(conn, session_id, &mut session, classifier)?;
        Ok(session.view(session_id))
    })
}

/// Discards the photo and classification and returns to the camera.
pub fn retake(db: &Db, volunteer_id: &str, session_id: &str) -> Result<CaptureSession, AppError> {
    let session = db.with_conn(|conn| {
        let mut session = load_session(conn, volunteer_id, session_id)?;
        session.flow.retake()?;
        session.photo = None;
        save_session(conn, session_id, &session)?;
        Ok(session.view(session_id))
    })?;
    tracing::info!(session_id, volunteer_id, "capture retaken");
    Ok(session)
}

/// Turns a confirmed session into a pending report and credits the reporter.
pub fn submit(
    db: &Db,
    volunteer_id: &str,
    session_id: &str,
    req: SubmitReportRequest,
    classifier: &dyn Classifier,
) -> Result<SubmitReportResult, AppError> {
    let id = Uuid::new_v4().to_string();
    let report = db.with_tx(|conn| {
        let mut session = load_session(conn, volunteer_id, session_id)?;
        settle(conn, session_id, &mut session, classifier)?;
        let draft = session.flow.submit(req.quantity)?;
        conn.execute(
            "INSERT INTO debris_reports (id, volunteer_id, photo, latitude, longitude, location,
                debris_type, quantity, confidence, status, offline_sync, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'pending', ?10, ?11)",
            params![
                id,
                volunteer_id,
                session.photo,
                session.latitude,
                session.longitude,
                session.location,
                draft.debris_type,
                draft.quantity,
                draft.confidence as i64,
                session.offline_sync,
                validation::format_timestamp(Utc::now()),
            ],
        )?;
        conn.execute(
            "UPDATE volunteers SET xp = xp + ?2, report_count = report_count + 1,
                last_active_at = ?3
             WHERE id = ?1",
            params![volunteer_id, REPORT_XP, validation::format_timestamp(Utc::now())],
        )?;
        conn.execute("DELETE FROM capture_sessions WHERE id = ?1", params![session_id])?;
        load(conn, &id)
    })?;
    tracing::info!(report_id = %report.id, volunteer_id, debris_type = %report.debris_type, "report submitted");
    Ok(SubmitReportResult {
        report,
        xp_awarded: REPORT_XP,
        message: format!("Report submitted successfully! +{} XP", REPORT_XP),
    })
}

// volunteer history

pub fn history(db: &Db, volunteer_id: &str) -> Result<ReportHistory, AppError> {
    let reports = db.with_conn(|conn| {
        volunteers::load(conn, volunteer_id)?;
        query(
            conn,
            &format!(
                "{} WHERE r.volunteer_id = ?1 ORDER BY r.created_at DESC, r.rowid DESC",
                SELECT
            ),
            &[&volunteer_id],
        )
    })?;
    let count = |status: ReviewStatus| reports.iter().filter(|r| r.status == status).count();
    Ok(ReportHistory {
        verified: count(ReviewStatus::Verified),
        pending: count(ReviewStatus::Pending),
        rejected: count(ReviewStatus::Rejected),
        reports,
    })
}

pub fn delete(db: &Db, volunteer_id: &str, report_id: &str) -> Result<(), AppError> {
    db.with_tx(|conn| {
        let report = load(conn, report_id)?;
        if report.volunteer_id != volunteer_id {
            return Err(AppError::NotFound("Report not found".into()));
        }
        if report.status != ReviewStatus::Pending {
            return Err(AppError::Conflict(format!("Report has already been {}", report.status)));
        }
        conn.execute("DELETE FROM debris_reports WHERE id = ?1", params![report_id])?;
        conn.execute(
            "UPDATE volunteers SET report_count = MAX(report_count - 1, 0),
                xp = MAX(xp - ?2, 0)
             WHERE id = ?1",
            params![volunteer_id, REPORT_XP],
        )?;
        Ok(())
    })?;
    tracing::info!(report_id, volunteer_id, "report deleted");
    Ok(())
}

pub fn photo(db: &Db, report_id: &str) -> Result<Vec<u8>, AppError> {
    let photo: Option<Vec<u8>> = db.with_conn(|conn| {
        conn.query_row(
            "SELECT photo FROM debris_reports WHERE id = ?1",
            params![report_id],
            |row| row.get(0),
        )
        .map_err(|e| not_found_on_empty(e, "Report"))
    })?;
    photo.ok_or_else(|| AppError::NotFound("Report has no photo".into()))
}

// coordinator review

pub struct Reports;

impl ReviewSource for Reports {
    type Item = DebrisReport;

    const SINGULAR: &'static str = "report";
    const PLURAL: &'static str = "reports";

    fn load(conn: &Connection) -> Result<Vec<DebrisReport>, AppError> {
        query(conn, &format!("{} ORDER BY r.rowid", SELECT), &[])
    }

    /// Each decision feeds the reporter's accuracy score.
    fn apply(conn: &Connection, report: &DebrisReport) -> Result<(), AppError> {
        conn.execute(
            "UPDATE debris_reports SET status = ?2 WHERE id = ?1 AND status = 'pending'",
            params![report.id, report.status],
        )?;
        let column = match report.status {
            ReviewStatus::Verified => "reports_verified",
            _ => "reports_rejected",
        };
        conn.execute(
            &format!("UPDATE volunteers SET {0} = {0} + 1 WHERE id = ?1", column),
            params![report.volunteer_id],
        )?;
        let counts: Option<(i64, i64)> = conn
            .query_row(
                "SELECT reports_verified, reports_rejected FROM volunteers WHERE id = ?1",
                params![report.volunteer_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        let Some((verified, rejected)) = counts else {
            return Ok(());
        };
        conn.execute(
            "UPDATE volunteers SET ai_accuracy = ?2 WHERE id = ?1",
            params![report.volunteer_id, leaderboard::accuracy(verified, rejected)],
        )?;
        let (title, verb) = match report.status {
            ReviewStatus::Verified => ("Report Verified", "was verified"),
            _ => ("Report Rejected", "was not accepted"),
        };
        notifications::push(
            conn,
            &report.volunteer_id,
            NotificationKind::Review,
            title,
            &format!("Your debris report at {} {}", report.location, verb),
        )?;
        Ok(())
    }
}

pub fn queue(db: &Db, q: &QueueQuery) -> Result<QueueView<DebrisReport>, AppError> {
    review::show::<Reports>(db, q)
}

pub fn decide(
    db: &Db,
    req: &BulkDecisionRequest,
    status: ReviewStatus,
) -> Result<QueueView<DebrisReport>, AppError> {
    let selection = if req.select_all {
        Selection::AllPending
    } else if req.ids.is_empty() {
        return Err(AppError::BadRequest("Select at least one report".into()));
    } else {
        Selection::Ids(&req.ids)
    };
    review::decide::<Reports>(db, selection, status, req.active.as_deref())
}

pub fn triage(db: &Db, req: &TriageRequest) -> Result<QueueView<DebrisReport>, AppError> {
    review::triage::<Reports>(db, req)
}

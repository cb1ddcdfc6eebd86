use crate::db::Db;
use crate::error::{not_found_on_empty, AppError};
use crate::models::types::RegistrationStatus;
use crate::models::volunteer::*;
use crate::services::password;
use crate::validation;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const COLUMNS: &str = "id, username, email, contact_number, organization, department, job_scope,
    status, submitted_at, decided_at";

fn from_row(row: &Row) -> rusqlite::Result<CoordinatorRegistration> {
    Ok(CoordinatorRegistration {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        contact_number: row.get(3)?,
        organization: row.get(4)?,
        department: row.get(5)?,
        job_scope: row.get(6)?,
        status: row.get(7)?,
        submitted_at: row.get(8)?,
        decided_at: row.get(9)?,
    })
}

fn load(conn: &Connection, id: &str) -> Result<CoordinatorRegistration, AppError> {
    conn.query_row(
        &format!("SELECT {} FROM registrations WHERE id = ?1", COLUMNS),
        params![id],
        from_row,
    )
    .map_err(|e| not_found_on_empty(e, "Registration"))
}

/// Files a coordinator account request for review.
pub fn submit(db: &Db, req: CoordinatorRegistrationRequest) -> Result<RegistrationResult, AppError> {
    let username = validation::validate_name(&req.username, "Username")?;
    let email = validation::validate_email(&req.email)?;
    let organization = validation::validate_name(&req.organization, "Organization")?;
    validation::validate_password(&req.password, &req.confirm_password)?;
    let id = Uuid::new_v4().to_string();

    db.with_conn(|conn| {
        let open: i64 = conn.query_row(
            "SELECT COUNT(*) FROM registrations WHERE email = ?1 AND status != 'rejected'",
            params![email],
            |row| row.get(0),
        )?;
        if open > 0 {
            return Err(AppError::Conflict("A registration for this email already exists".into()));
        }
        conn.execute(
            "INSERT INTO registrations (id, username, email, contact_number, organization,
                department, job_scope, password_hash, status, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id,
                username,
                email,
                req.contact_number.trim(),
                organization,
                req.department.trim(),
                req.job_scope.trim(),
                password::hash_password(&req.password),
                RegistrationStatus::Pending,
                validation::format_timestamp(Utc::now()),
            ],
        )?;
        Ok(())
    })?;
    tracing::info!(registration_id = %id, "coordinator registration submitted");

    Ok(RegistrationResult {
        id,
        status: RegistrationStatus::Pending.to_string(),
        message: "Registration submitted. An administrator will review your request.".into(),
    })
}

/// Newest first, optionally filtered by status.
pub fn list(db: &Db, query: &RegistrationQuery) -> Result<Vec<CoordinatorRegistration>, AppError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM registrations
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY submitted_at DESC, rowid DESC",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![query.status], from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })
}

pub fn pending_count(conn: &Connection) -> Result<i64, AppError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM registrations WHERE status = 'pending'",
        [],
        |row| row.get(0),
    )?)
}

/// Approves or rejects a pending request. Decisions are final.
pub fn decide(
    db: &Db,
    id: &str,
    status: RegistrationStatus,
) -> Result<CoordinatorRegistration, AppError> {
    if status == RegistrationStatus::Pending {
        return Err(AppError::BadRequest("Decision must be approved or rejected".into()));
    }
    let registration = db.with_tx(|conn| {
        let current = load(conn, id)?;
        if current.status != RegistrationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Registration has already been {}",
                current.status
            )));
        }
        conn.execute(
            "UPDATE registrations SET status = ?2, decided_at = ?3 WHERE id = ?1",
            params![id, status, validation::format_timestamp(Utc::now())],
        )?;
        load(conn, id)
    })?;
    tracing::info!(registration_id = %id, status = %status, "registration decided");
    Ok(registration)
}

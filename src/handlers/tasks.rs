use super::{acting_volunteer, no_content, State};
use crate::error::AppError;
use crate::models::review::{QueueQuery, TriageRequest};
use crate::models::task_log::*;
use crate::models::types::ReviewStatus;
use crate::services::task_logs;
use ntex::web::{self, HttpRequest, HttpResponse};

pub async fn details(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let details = task_logs::details(&state.db, &path, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&details))
}

pub async fn complete(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<TaskCompletionRequest>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let result = task_logs::complete(&state.db, &path, &volunteer_id, body.into_inner())?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn history(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let history = task_logs::history(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&history))
}

pub async fn edit_log(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<TaskLogEdit>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let log = task_logs::edit(&state.db, &volunteer_id, &path, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&log))
}

pub async fn delete_log(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    task_logs::delete(&state.db, &volunteer_id, &path)?;
    Ok(no_content())
}

// coordinator

pub async fn review_queue(
    state: State,
    query: web::types::Query<QueueQuery>,
) -> Result<HttpResponse, AppError> {
    let view = task_logs::queue(&state.db, &query)?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn verify(
    state: State,
    path: web::types::Path<String>,
    query: web::types::Query<QueueQuery>,
) -> Result<HttpResponse, AppError> {
    let view = task_logs::decide(&state.db, &path, ReviewStatus::Verified, query.active.as_deref())?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn reject(
    state: State,
    path: web::types::Path<String>,
    query: web::types::Query<QueueQuery>,
) -> Result<HttpResponse, AppError> {
    let view = task_logs::decide(&state.db, &path, ReviewStatus::Rejected, query.active.as_deref())?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn triage(
    state: State,
    body: web::types::Json<TriageRequest>,
) -> Result<HttpResponse, AppError> {
    let view = task_logs::triage(&state.db, &body)?;
    Ok(HttpResponse::Ok().json(&view))
}

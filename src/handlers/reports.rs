use super::{acting_volunteer, no_content, State};
use crate::capture::Classifier;
use crate::error::AppError;
use crate::models::report::*;
use crate::models::review::{BulkDecisionRequest, QueueQuery, TriageRequest};
use crate::models::types::ReviewStatus;
use crate::services::reports;
use ntex::web::{self, HttpRequest, HttpResponse};

/// Captures a photo and waits out the classifier before answering at the
/// confirm step. The store lock is not held while waiting, and a session
/// abandoned mid-wait is still classified on its next read.
pub async fn capture(
    req: HttpRequest,
    state: State,
    body: web::types::Json<CaptureRequest>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let session = reports::begin_capture(&state.db, &volunteer_id, body.into_inner())?;
    let latency = state.classifier.latency();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    let session = reports::finish_capture(&state.db, &volunteer_id, &session.id, state.classifier.as_ref())?;
    Ok(HttpResponse::Ok().json(&session))
}

pub async fn get_session(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let session = reports::get_session(&state.db, &volunteer_id, &path, state.classifier.as_ref())?;
    Ok(HttpResponse::Ok().json(&session))
}

pub async fn retake(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let session = reports::retake(&state.db, &volunteer_id, &path)?;
    Ok(HttpResponse::Ok().json(&session))
}

pub async fn submit(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<SubmitReportRequest>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let result = reports::submit(
        &state.db,
        &volunteer_id,
        &path,
        body.into_inner(),
        state.classifier.as_ref(),
    )?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn history(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let history = reports::history(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&history))
}

pub async fn delete_report(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    reports::delete(&state.db, &volunteer_id, &path)?;
    Ok(no_content())
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

pub async fn photo(state: State, path: web::types::Path<String>) -> Result<HttpResponse, AppError> {
    let bytes = reports::photo(&state.db, &path)?;
    Ok(HttpResponse::Ok()
        .content_type(sniff_content_type(&bytes))
        .body(bytes))
}

// coordinator

pub async fn review_queue(
    state: State,
    query: web::types::Query<QueueQuery>,
) -> Result<HttpResponse, AppError> {
    let view = reports::queue(&state.db, &query)?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn verify(
    state: State,
    body: web::types::Json<BulkDecisionRequest>,
) -> Result<HttpResponse, AppError> {
    let view = reports::decide(&state.db, &body, ReviewStatus::Verified)?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn reject(
    state: State,
    body: web::types::Json<BulkDecisionRequest>,
) -> Result<HttpResponse, AppError> {
    let view = reports::decide(&state.db, &body, ReviewStatus::Rejected)?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn triage(
    state: State,
    body: web::types::Json<TriageRequest>,
) -> Result<HttpResponse, AppError> {
    let view = reports::triage(&state.db, &body)?;
    Ok(HttpResponse::Ok().json(&view))
}

use super::{acting_volunteer, no_content, State};
use crate::error::AppError;
use crate::services::notifications;
use ntex::web::{self, HttpRequest, HttpResponse};

pub async fn list_notifications(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let feed = notifications::feed(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&feed))
}

pub async fn mark_read(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let result = notifications::mark_read(&state.db, &volunteer_id, &path)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn mark_all_read(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let result = notifications::mark_all_read(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn delete_notification(
    req: HttpRequest,
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    notifications::delete(&state.db, &volunteer_id, &path)?;
    Ok(no_content())
}

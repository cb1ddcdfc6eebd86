use super::{no_content, State};
use crate::error::AppError;
use crate::models::schedule::ScheduleForm;
use crate::services::schedules;
use ntex::web::{self, HttpResponse};

pub async fn list_schedules(state: State) -> Result<HttpResponse, AppError> {
    let list = schedules::list(&state.db)?;
    Ok(HttpResponse::Ok().json(&list))
}

pub async fn create_schedule(
    state: State,
    body: web::types::Json<ScheduleForm>,
) -> Result<HttpResponse, AppError> {
    let created = schedules::create(&state.db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&created))
}

pub async fn update_schedule(
    state: State,
    path: web::types::Path<String>,
    body: web::types::Json<ScheduleForm>,
) -> Result<HttpResponse, AppError> {
    let updated = schedules::update(&state.db, &path, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&updated))
}

pub async fn delete_schedule(
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    schedules::delete(&state.db, &path)?;
    Ok(no_content())
}

pub async fn toggle_volunteer(
    state: State,
    path: web::types::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (schedule_id, volunteer_id) = path.into_inner();
    let result = schedules::toggle_volunteer(&state.db, &schedule_id, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&result))
}

pub async fn auto_assign(
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let result = schedules::auto_assign(&state.db, &path)?;
    Ok(HttpResponse::Ok().json(&result))
}

use super::{acting_volunteer, State};
use crate::error::AppError;
use crate::models::volunteer::VolunteerQuery;
use crate::services::volunteers;
use ntex::web::{self, HttpRequest, HttpResponse};

pub async fn profile(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let profile = volunteers::profile(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&profile))
}

pub async fn list_volunteers(
    state: State,
    query: web::types::Query<VolunteerQuery>,
) -> Result<HttpResponse, AppError> {
    let list = volunteers::list(&state.db, &query)?;
    Ok(HttpResponse::Ok().json(&list))
}

pub async fn volunteer_history(
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let history = volunteers::history(&state.db, &path)?;
    Ok(HttpResponse::Ok().json(&history))
}

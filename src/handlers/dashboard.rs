use super::{acting_volunteer, State};
use crate::error::AppError;
use crate::services::dashboard;
use ntex::web::{HttpRequest, HttpResponse};

pub async fn volunteer_dashboard(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let view = dashboard::volunteer(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&view))
}

pub async fn coordinator_dashboard(state: State) -> Result<HttpResponse, AppError> {
    let view = dashboard::coordinator(&state.db)?;
    Ok(HttpResponse::Ok().json(&view))
}

use super::{acting_volunteer, State};
use crate::error::AppError;
use crate::models::settings::SettingsPatch;
use crate::services::settings::{self, COORDINATOR_ACCOUNT};
use ntex::web::{self, HttpRequest, HttpResponse};

pub async fn volunteer_settings(req: HttpRequest, state: State) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let current = settings::get(&state.db, &volunteer_id)?;
    Ok(HttpResponse::Ok().json(&current))
}

pub async fn update_volunteer_settings(
    req: HttpRequest,
    state: State,
    body: web::types::Json<SettingsPatch>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let updated = settings::update(&state.db, &volunteer_id, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&updated))
}

pub async fn coordinator_settings(state: State) -> Result<HttpResponse, AppError> {
    let current = settings::get(&state.db, COORDINATOR_ACCOUNT)?;
    Ok(HttpResponse::Ok().json(&current))
}

pub async fn update_coordinator_settings(
    state: State,
    body: web::types::Json<SettingsPatch>,
) -> Result<HttpResponse, AppError> {
    let updated = settings::update(&state.db, COORDINATOR_ACCOUNT, body.into_inner())?;
    Ok(HttpResponse::Ok().json(&updated))
}

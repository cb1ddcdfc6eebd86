use super::State;
use crate::error::AppError;
use crate::models::types::RegistrationStatus;
use crate::models::volunteer::*;
use crate::services::{registrations, volunteers};
use ntex::web::{self, HttpResponse};

pub async fn register_volunteer(
    state: State,
    body: web::types::Json<VolunteerRegistration>,
) -> Result<HttpResponse, AppError> {
    let result = volunteers::register(&state.db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn register_coordinator(
    state: State,
    body: web::types::Json<CoordinatorRegistrationRequest>,
) -> Result<HttpResponse, AppError> {
    let result = registrations::submit(&state.db, body.into_inner())?;
    Ok(HttpResponse::Created().json(&result))
}

pub async fn list_registrations(
    state: State,
    query: web::types::Query<RegistrationQuery>,
) -> Result<HttpResponse, AppError> {
    let list = registrations::list(&state.db, &query)?;
    Ok(HttpResponse::Ok().json(&list))
}

pub async fn approve_registration(
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let decided = registrations::decide(&state.db, &path, RegistrationStatus::Approved)?;
    Ok(HttpResponse::Ok().json(&decided))
}

pub async fn reject_registration(
    state: State,
    path: web::types::Path<String>,
) -> Result<HttpResponse, AppError> {
    let decided = registrations::decide(&state.db, &path, RegistrationStatus::Rejected)?;
    Ok(HttpResponse::Ok().json(&decided))
}

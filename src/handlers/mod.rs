pub mod accounts;
pub mod dashboard;
pub mod hotspots;
pub mod leaderboard;
pub mod notifications;
pub mod reports;
pub mod schedules;
pub mod settings;
pub mod tasks;
pub mod volunteers;

use crate::capture::Classifier;
use crate::config::ServerConfig;
use crate::db::Db;
use crate::error::AppError;
use crate::services::volunteers as volunteer_service;
use ntex::web::{self, HttpRequest, HttpResponse};
use std::sync::Arc;

pub const VOLUNTEER_HEADER: &str = "X-Volunteer-Id";

/// Shared by every worker.
pub struct AppState {
    pub db: Db,
    pub config: ServerConfig,
    pub classifier: Box<dyn Classifier>,
}

pub type State = web::types::State<Arc<AppState>>;

/// The volunteer a request acts for: the `X-Volunteer-Id` header, else the
/// configured default. Unknown ids are a 404.
pub fn acting_volunteer(req: &HttpRequest, state: &AppState) -> Result<String, AppError> {
    let id = req
        .headers()
        .get(VOLUNTEER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(&state.config.default_volunteer)
        .to_string();
    volunteer_service::get(&state.db, &id)?;
    Ok(id)
}

pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

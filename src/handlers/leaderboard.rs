use super::{acting_volunteer, State};
use crate::error::AppError;
use crate::models::leaderboard::*;
use crate::services::leaderboard;
use ntex::web::{self, HttpRequest, HttpResponse};

pub async fn volunteer_leaderboard(
    req: HttpRequest,
    state: State,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let volunteer_id = acting_volunteer(&req, &state)?;
    let board = leaderboard::for_volunteer(&state.db, &volunteer_id, query.limit)?;
    Ok(HttpResponse::Ok().json(&board))
}

pub async fn coordinator_leaderboard(
    state: State,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let board = leaderboard::for_coordinator(&state.db, query.limit)?;
    Ok(HttpResponse::Ok().json(&board))
}

pub async fn send_reward(
    state: State,
    path: web::types::Path<String>,
    body: Option<web::types::Json<RewardRequest>>,
) -> Result<HttpResponse, AppError> {
    let req = body.map(|b| b.into_inner()).unwrap_or_default();
    let result = leaderboard::reward(&state.db, &path, req)?;
    Ok(HttpResponse::Ok().json(&result))
}

use super::State;
use crate::error::AppError;
use crate::models::hotspot::{HotspotFilter, HotspotQuery};
use crate::services::hotspots;
use ntex::web::{self, HttpResponse};

pub async fn list_hotspots(
    state: State,
    query: web::types::Query<HotspotQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = HotspotFilter::from_query(&query)?;
    let list = hotspots::list(&state.db, &filter)?;
    Ok(HttpResponse::Ok().json(&list))
}

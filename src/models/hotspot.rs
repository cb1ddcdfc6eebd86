use super::types::{DebrisType, Density};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Hotspot {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub density: Density,
    pub report_count: i64,
    pub debris_type: DebrisType,
    pub trend: i64,
    pub quantity: f64,
}

/// Hotspot filter. `debris_types` holds the accepted types; empty accepts all.
#[derive(Debug, Default)]
pub struct HotspotFilter {
    pub debris_types: Vec<DebrisType>,
    pub min_reports: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct HotspotQuery {
    /// Comma separated, e.g. `Plastic,Fishing Gear`.
    pub debris_types: Option<String>,
    pub min_reports: Option<i64>,
}

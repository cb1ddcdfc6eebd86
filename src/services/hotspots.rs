use crate::db::Db;
use crate::error::AppError;
use crate::models::hotspot::*;
use crate::validation;

impl HotspotFilter {
    pub fn from_query(query: &HotspotQuery) -> Result<Self, AppError> {
        Ok(HotspotFilter {
            debris_types: match &query.debris_types {
                Some(csv) => validation::parse_debris_types(csv)?,
                None => Vec::new(),
            },
            min_reports: query.min_reports.unwrap_or(0).max(0),
        })
    }

    pub fn accepts(&self, hotspot: &Hotspot) -> bool {
        hotspot.report_count >= self.min_reports
            && (self.debris_types.is_empty() || self.debris_types.contains(&hotspot.debris_type))
    }
}

pub fn list(db: &Db, filter: &HotspotFilter) -> Result<Vec<Hotspot>, AppError> {
    let all = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, name, latitude, longitude, density, report_count, debris_type, trend, quantity
             FROM hotspots ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Hotspot {
                id: row.get(0)?,
                name: row.get(1)?,
                latitude: row.get(2)?,
                longitude: row.get(3)?,
                density: row.get(4)?,
                report_count: row.get(5)?,
                debris_type: row.get(6)?,
                trend: row.get(7)?,
                quantity: row.get(8)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    })?;
    Ok(all.into_iter().filter(|h| filter.accepts(h)).collect())
}

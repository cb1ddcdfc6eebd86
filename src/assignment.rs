/// A volunteer eligible for a schedule, with its distance to the site in km.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub volunteer_id: String,
    pub proximity_km: f64,
}

/// Number of volunteers a schedule still needs; zero when fully staffed.
pub fn shortfall(required: i64, assigned: usize) -> usize {
    let assigned = i64::try_from(assigned).unwrap_or(i64::MAX);
    usize::try_from(required.saturating_sub(assigned)).unwrap_or(0)
}

/// Picks the closest unassigned candidates to fill the schedule.
///
/// Candidates are taken in ascending proximity; equal distances keep their
/// input order. Never returns more than `required - assigned.len()` ids.
pub fn pick_nearest(candidates: &[Candidate], assigned: &[String], required: i64) -> Vec<String> {
    let needed = shortfall(required, assigned.len());
    if needed == 0 {
        return Vec::new();
    }

    let mut available: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| !assigned.contains(&c.volunteer_id))
        .collect();
    // sort_by is stable; NaN distances go last
    available.sort_by(|a, b| {
        a.proximity_km
            .partial_cmp(&b.proximity_km)
            .unwrap_or_else(|| a.proximity_km.is_nan().cmp(&b.proximity_km.is_nan()))
    });

    available
        .into_iter()
        .take(needed)
        .map(|c| c.volunteer_id.clone())
        .collect()
}

/// Adds `volunteer_id` when absent, removes it when present. Returns whether it
/// is assigned afterwards.
pub fn toggle(assigned: &mut Vec<String>, volunteer_id: &str) -> bool {
    match assigned.iter().position(|v| v == volunteer_id) {
        Some(pos) => {
            assigned.remove(pos);
            false
        }
        None => {
            assigned.push(volunteer_id.to_string());
            true
        }
    }
}

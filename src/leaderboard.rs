//! Ranking and badge rules. Standings are recomputed on every read.

use crate::models::leaderboard::LeaderboardEntry;

#[derive(Debug, Clone, Copy)]
enum Threshold {
    Reports(i64),
    WeightKg(f64),
    Accuracy(i64),
}

const BADGES: &[(&str, Threshold)] = &[
    ("First Report", Threshold::Reports(1)),
    ("Eagle Eye", Threshold::Reports(25)),
    ("100kg Club", Threshold::WeightKg(100.0)),
    ("Ocean Champion", Threshold::WeightKg(200.0)),
    ("AI Master", Threshold::Accuracy(90)),
];

#[derive(Debug, Clone)]
pub struct Standing {
    pub volunteer_id: String,
    pub name: String,
    pub verified_weight: f64,
    pub xp: i64,
    pub ai_accuracy: i64,
    pub report_count: i64,
    pub previous_rank: Option<i64>,
}

pub fn badges(report_count: i64, verified_weight: f64, ai_accuracy: i64) -> Vec<String> {
    BADGES
        .iter()
        .filter(|(_, threshold)| match *threshold {
            Threshold::Reports(n) => report_count >= n,
            Threshold::WeightKg(kg) => verified_weight >= kg,
            Threshold::Accuracy(pct) => ai_accuracy >= pct,
        })
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Smallest weight badge threshold still above `verified_weight`.
pub fn next_badge_weight(verified_weight: f64) -> Option<f64> {
    BADGES
        .iter()
        .filter_map(|(_, threshold)| match *threshold {
            Threshold::WeightKg(kg) if kg > verified_weight => Some(kg),
            _ => None,
        })
        .fold(None, |best: Option<f64>, kg| match best {
            Some(b) if b <= kg => Some(b),
            _ => Some(kg),
        })
}

/// Percentage of the way to the next weight badge; 100 once all are earned.
pub fn badge_progress(verified_weight: f64) -> f64 {
    match next_badge_weight(verified_weight) {
        Some(target) if target > 0.0 => ((verified_weight / target) * 100.0).clamp(0.0, 100.0),
        _ => 100.0,
    }
}

/// Orders by verified weight, then xp, then input order, and numbers from 1.
pub fn rank(mut standings: Vec<Standing>) -> Vec<LeaderboardEntry> {
    standings.sort_by(|a, b| {
        b.verified_weight
            .total_cmp(&a.verified_weight)
            .then_with(|| b.xp.cmp(&a.xp))
    });
    standings
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let rank = i + 1;
            let rank_change = s.previous_rank.map(|p| p - rank as i64).unwrap_or(0);
            LeaderboardEntry {
                rank,
                badges: badges(s.report_count, s.verified_weight, s.ai_accuracy),
                volunteer_id: s.volunteer_id,
                name: s.name,
                verified_weight: s.verified_weight,
                xp: s.xp,
                ai_accuracy: s.ai_accuracy,
                rank_change,
            }
        })
        .collect()
}

/// Share of decided reports that were verified, as a whole percentage.
pub fn accuracy(verified: i64, rejected: i64) -> i64 {
    let decided = verified + rejected;
    if decided <= 0 {
        0
    } else {
        ((verified as f64 / decided as f64) * 100.0).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(id: &str, weight: f64, xp: i64, previous: Option<i64>) -> Standing {
        Standing {
            volunteer_id: id.into(),
            name: id.to_uppercase(),
            verified_weight: weight,
            xp,
            ai_accuracy: 80,
            report_count: 3,
            previous_rank: previous,
        }
    }

    #[test]
    fn test_rank_orders_by_weight_then_xp() {
        let entries = rank(vec![
            standing("a", 100.0, 10, Some(1)),
            standing("b", 250.0, 5, Some(3)),
            standing("c", 100.0, 20, None),
            standing("d", 100.0, 20, None),
        ]);
        let order: Vec<&str> = entries.iter().map(|e| e.volunteer_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "d", "a"]);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[0].rank_change, 2);
        assert_eq!(entries[3].rank_change, -3);
        assert_eq!(entries[1].rank_change, 0);
    }

    #[test]
    fn test_badges_from_thresholds() {
        assert!(badges(0, 0.0, 0).is_empty());
        assert_eq!(badges(1, 150.0, 91), vec!["First Report", "100kg Club", "AI Master"]);
        assert_eq!(badges(30, 234.0, 50).len(), 4);
    }

    #[test]
    fn test_next_badge_weight_and_progress() {
        assert_eq!(next_badge_weight(87.0), Some(100.0));
        assert_eq!(next_badge_weight(156.0), Some(200.0));
        assert_eq!(next_badge_weight(234.0), None);
        assert!((badge_progress(87.0) - 87.0).abs() < 1e-9);
        assert_eq!(badge_progress(500.0), 100.0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(22, 2), 92);
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(accuracy(1, 0), 100);
    }
}

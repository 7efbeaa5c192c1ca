//! Geographic indicator (§4.3): flags impossible or suspicious travel speed, and
//! abrupt country changes, against the user's five most recent prior trips.

use crate::config::RiskConfig;
use crate::geodesy::distance_km;
use crate::history::HistoryIndex;
use crate::types::Transaction;

/// Score the geographic indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;

    let mut priors: Vec<&Transaction> = history
        .by_user(&txn.user_id)
        .filter(|p| p.timestamp < t0)
        .collect();
    if priors.is_empty() {
        return (0.0, Vec::new());
    }
    priors.sort_by_key(|p| std::cmp::Reverse(p.timestamp));

    let speed = &config.speed;
    let mut max_score: f64 = 0.0;
    let mut triggered = Vec::new();

    for prev in priors.into_iter().take(5) {
        let dt_h = (t0 - prev.timestamp).num_seconds() as f64 / 3600.0;
        if dt_h <= 0.0 {
            continue;
        }
        let d = distance_km(prev.pickup_lat, prev.pickup_lng, txn.pickup_lat, txn.pickup_lng);
        let v = d / dt_h;

        if v > speed.impossible_kmh && d > speed.min_distance_km {
            max_score = max_score.max(100.0);
            triggered.push(format!(
                "GEO_IMPOSSIBLE_TRAVEL: {d:.0}km in {dt_h:.1}h ({v:.0}km/h) from {} to {}",
                prev.pickup_city, txn.pickup_city
            ));
        } else if v > speed.suspicious_kmh && d > speed.min_distance_km {
            max_score = max_score.max(70.0);
            triggered.push(format!(
                "GEO_SUSPICIOUS_TRAVEL: {d:.0}km in {dt_h:.1}h ({v:.0}km/h)"
            ));
        } else if prev.pickup_country != txn.pickup_country
            && dt_h < speed.country_change_window_hours as f64
        {
            max_score = max_score.max(80.0);
            triggered.push(format!(
                "GEO_COUNTRY_CHANGE: {} to {} in {dt_h:.1}h",
                prev.pickup_country, txn.pickup_country
            ));
        }
    }

    (max_score.min(100.0), triggered)
}

/// A convenience re-export so collusion's circular-route check shares one distance call site.
pub(crate) fn trip_distance_km(t: &Transaction) -> f64 {
    distance_km(t.pickup_lat, t.pickup_lng, t.dropoff_lat, t.dropoff_lng)
}

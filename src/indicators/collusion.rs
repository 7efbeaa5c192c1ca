//! Collusion indicator (§4.6): flags a user/driver pair that rides together
//! suspiciously often, especially on suspiciously short circular routes.

use crate::config::RiskConfig;
use crate::history::HistoryIndex;
use crate::indicators::geographic::trip_distance_km;
use crate::types::Transaction;
use chrono::Duration;

/// Score the collusion indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;
    let cfg = &config.collusion;
    let window_start = t0 - Duration::days(cfg.lookback_days);

    let pairs: Vec<&Transaction> = history
        .by_pair(&txn.user_id, &txn.driver_id)
        .filter(|p| p.timestamp >= window_start && p.timestamp <= t0)
        .collect();
    let pair_count = pairs.len() as u32;

    let circular_count = pairs
        .iter()
        .filter(|p| trip_distance_km(p) < cfg.circular_distance_km)
        .count() as u32;

    let mut score: f64 = 0.0;
    let mut triggered = Vec::new();

    if pair_count >= cfg.high {
        score = 80.0;
        triggered.push(format!("COLLUSION_HIGH: {pair_count} rides with same driver in {}d", cfg.lookback_days));
    } else if pair_count >= cfg.moderate {
        score = 40.0;
        triggered.push(format!("COLLUSION_MODERATE: {pair_count} rides with same driver in {}d", cfg.lookback_days));
    }

    if circular_count >= cfg.circular_count {
        score = (score + 20.0).min(100.0);
        triggered.push(format!("COLLUSION_CIRCULAR: {circular_count} circular rides with same driver"));
    }

    if trip_distance_km(txn) < cfg.circular_distance_km && pair_count >= cfg.circular_current_min_pairs {
        score = (score + 15.0).min(100.0);
        triggered.push("COLLUSION_CIRCULAR_CURRENT: current trip is circular with a repeat driver".to_string());
    }

    (score, triggered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, PaymentStatus};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn txn(id: &str, hour: u32, lat: f64, lng: f64, drop_lat: f64, drop_lng: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 2, 15, hour.min(23), 0, 0).unwrap(),
            user_id: "U1".to_string(),
            driver_id: "D1".to_string(),
            card_last4: "1234".to_string(),
            device_id: "DEV1".to_string(),
            pickup_city: "Lagos".to_string(),
            pickup_country: "NG".to_string(),
            pickup_lat: lat,
            pickup_lng: lng,
            dropoff_city: "Lagos".to_string(),
            dropoff_lat: drop_lat,
            dropoff_lng: drop_lng,
            distance_km: 5.0,
            duration_minutes: 15.0,
            amount: Decimal::from(100),
            currency: Currency::Ngn,
            payment_status: PaymentStatus::Completed,
            is_fraudulent: false,
        }
    }

    #[test]
    fn frequent_same_pair_scores_high() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        for hour in 0..8 {
            history.push(txn(&format!("p{hour}"), hour, 6.52, 3.37, 6.60, 3.45));
        }
        let current = txn("current", 20, 6.52, 3.37, 6.60, 3.45);
        let (score, rules) = score(&current, &history, &config);
        assert!(score >= 80.0, "expected high collusion score, got {score}");
        assert!(rules.iter().any(|r| r.starts_with("COLLUSION_HIGH")));
    }

    #[test]
    fn circular_rides_add_boost() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        for hour in 0..8 {
            history.push(txn(&format!("p{hour}"), hour, 6.5244, 3.3792, 6.5244, 3.3792));
        }
        let current = txn("current", 20, 6.5244, 3.3792, 6.5244, 3.3792);
        let (score, rules) = score(&current, &history, &config);
        assert!(score > 80.0);
        assert!(rules.iter().any(|r| r.starts_with("COLLUSION_CIRCULAR")));
    }

    #[test]
    fn no_pair_history_scores_zero() {
        let config = RiskConfig::default();
        let history = HistoryIndex::new();
        let current = txn("current", 9, 6.52, 3.37, 6.60, 3.45);
        let (score, rules) = score(&current, &history, &config);
        assert_eq!(score, 0.0);
        assert!(rules.is_empty());
    }
}

//! Fraud-ring indicator (§4.8): flags a device shared by several distinct users in a
//! short window, especially when amounts and timing look coordinated.

use crate::config::RiskConfig;
use crate::history::HistoryIndex;
use crate::types::Transaction;
use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;

/// Score the fraud-ring indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;
    let cfg = &config.fraud_ring;
    let window_start = t0 - Duration::days(cfg.lookback_days);

    let subset: Vec<&Transaction> = history
        .by_device(&txn.device_id)
        .filter(|p| p.timestamp > window_start && p.timestamp < t0)
        .collect();

    let mut users: HashSet<&str> = subset.iter().map(|p| p.user_id.as_str()).collect();
    users.insert(txn.user_id.as_str());
    let distinct_users = users.len();
    let n = subset.len();

    let mut score: f64 = 0.0;
    let mut triggered = Vec::new();

    if distinct_users >= cfg.high_users {
        score = 90.0;
        triggered.push(format!("FRAUD_RING_HIGH: {distinct_users} distinct users sharing device {}", txn.device_id));
    } else if distinct_users == cfg.moderate_users {
        score = 70.0;
        triggered.push(format!("FRAUD_RING_MODERATE: {distinct_users} distinct users sharing device {}", txn.device_id));
    } else if distinct_users == cfg.low_users {
        score = 20.0;
        triggered.push(format!("FRAUD_RING_LOW: {distinct_users} distinct users sharing device {}", txn.device_id));
    }

    if distinct_users >= cfg.moderate_users && n >= 1 {
        let amounts: Vec<f64> = subset.iter().map(|p| p.amount.to_f64().unwrap_or(0.0)).collect();
        let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
        if mean > 0.0 {
            let within = amounts.iter().filter(|a| ((*a - mean) / mean).abs() < 0.2).count();
            let r = within as f64 / amounts.len() as f64;
            if r > cfg.similar_amount_fraction {
                score = (score + 20.0).min(100.0);
                triggered.push(format!("FRAUD_RING_SIMILAR_AMOUNTS: {:.0}% of amounts within 20% of mean", r * 100.0));
            }
        }
    }

    if distinct_users >= cfg.moderate_users {
        let mut timestamps: Vec<_> = subset.iter().map(|p| p.timestamp).collect();
        if timestamps.len() >= cfg.time_cluster_min_count {
            timestamps.sort();
            let span_hours = (*timestamps.last().unwrap() - *timestamps.first().unwrap()).num_seconds() as f64 / 3600.0;
            if span_hours < cfg.time_cluster_span_hours {
                score = (score + 15.0).min(100.0);
                triggered.push(format!("FRAUD_RING_TIME_CLUSTER: {} transactions within {span_hours:.1}h", timestamps.len()));
            }
        }
    }

    (score, triggered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, PaymentStatus};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn txn(id: &str, hour: u32, user: &str, amount: i64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 2, 15, hour.min(23), 0, 0).unwrap(),
            user_id: user.to_string(),
            driver_id: "D1".to_string(),
            card_last4: "1234".to_string(),
            device_id: "SHARED_DEVICE".to_string(),
            pickup_city: "Lagos".to_string(),
            pickup_country: "NG".to_string(),
            pickup_lat: 6.5244,
            pickup_lng: 3.3792,
            dropoff_city: "Lagos".to_string(),
            dropoff_lat: 6.6,
            dropoff_lng: 3.4,
            distance_km: 5.0,
            duration_minutes: 15.0,
            amount: Decimal::from(amount),
            currency: Currency::Ngn,
            payment_status: PaymentStatus::Completed,
            is_fraudulent: false,
        }
    }

    #[test]
    fn four_distinct_users_scores_high() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        history.push(txn("p1", 1, "U1", 1000));
        history.push(txn("p2", 2, "U2", 1000));
        history.push(txn("p3", 3, "U3", 1000));
        let current = txn("current", 4, "U4", 1000);
        let (score, rules) = score(&current, &history, &config);
        assert!(score >= 90.0, "expected high fraud-ring score, got {score}");
        assert!(rules.iter().any(|r| r.starts_with("FRAUD_RING_HIGH")));
    }

    #[test]
    fn single_user_device_scores_zero() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        history.push(txn("p1", 1, "U1", 1000));
        let current = txn("current", 2, "U1", 1000);
        let (score, rules) = score(&current, &history, &config);
        assert_eq!(score, 0.0);
        assert!(rules.is_empty());
    }
}

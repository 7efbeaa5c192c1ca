//! Velocity indicator (§4.2): flags bursts of transactions sharing a user, card, or
//! device within short time windows.

use crate::config::RiskConfig;
use crate::history::HistoryIndex;
use crate::types::Transaction;
use chrono::Duration;

fn count_in_window<'a>(
    matches: impl Iterator<Item = &'a Transaction>,
    t0: chrono::DateTime<chrono::Utc>,
    hours: i64,
) -> u32 {
    let window_start = t0 - Duration::hours(hours);
    matches
        .filter(|t| t.timestamp >= window_start && t.timestamp <= t0)
        .count() as u32
}

/// Score the velocity indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;
    let v = &config.velocity;

    let user_1h = count_in_window(history.by_user(&txn.user_id), t0, 1);
    let user_24h = count_in_window(history.by_user(&txn.user_id), t0, 24);
    let card_1h = count_in_window(history.by_card(&txn.card_last4), t0, 1);
    let card_2h = count_in_window(history.by_card(&txn.card_last4), t0, 2);
    let device_1h = count_in_window(history.by_device(&txn.device_id), t0, 1);

    let m1 = user_1h.max(card_1h).max(device_1h);
    // m2 deliberately folds user_1h into the 2h maximum, not just card_2h: preserved
    // verbatim from the source system's behavior (see SPEC_FULL.md §9 open question).
    let m2 = card_2h.max(user_1h);

    let mut scores = Vec::new();
    let mut triggered = Vec::new();

    if m1 >= v.extreme {
        scores.push(100.0);
        triggered.push(format!("VELOCITY_EXTREME: {m1} transactions in 1h"));
    } else if m1 >= v.very_high {
        scores.push(80.0);
        triggered.push(format!("VELOCITY_VERY_HIGH: {m1} transactions in 1h"));
    } else if m1 >= v.high {
        scores.push(50.0);
        triggered.push(format!("VELOCITY_HIGH: {m1} transactions in 1h"));
    } else if m1 >= v.moderate {
        scores.push(20.0);
        triggered.push(format!("VELOCITY_MODERATE: {m1} transactions in 1h"));
    }

    if m2 >= v.two_hour_high {
        scores.push(90.0);
        triggered.push(format!("VELOCITY_2H_HIGH: {m2} transactions in 2h"));
    }

    if user_24h >= v.day_high {
        scores.push(60.0);
        triggered.push(format!("VELOCITY_24H_HIGH: {user_24h} transactions in 24h"));
    }

    let final_score = scores.into_iter().fold(0.0, f64::max).min(100.0);
    (final_score, triggered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, PaymentStatus};
    use chrono::TimeZone;

    fn txn(id: &str, minute: u32, user: &str, card: &str, device: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 2, 15, 11, minute.min(59), 0).unwrap()
                + Duration::minutes(if minute >= 60 { (minute - 59) as i64 } else { 0 }),
            user_id: user.to_string(),
            driver_id: "D1".to_string(),
            card_last4: card.to_string(),
            device_id: device.to_string(),
            pickup_city: "Lagos".to_string(),
            pickup_country: "NG".to_string(),
            pickup_lat: 6.5244,
            pickup_lng: 3.3792,
            dropoff_city: "Lagos".to_string(),
            dropoff_lat: 6.6,
            dropoff_lng: 3.4,
            distance_km: 5.0,
            duration_minutes: 15.0,
            amount: rust_decimal::Decimal::from(100),
            currency: Currency::Ngn,
            payment_status: PaymentStatus::Completed,
            is_fraudulent: false,
        }
    }

    #[test]
    fn twelve_rapid_transactions_trigger_extreme_velocity() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        for i in 0..12 {
            history.push(txn(&format!("p{i}"), 50 + i, "U1", "1234", "D1"));
        }
        let current = Transaction {
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 2, 15, 12, 0, 0).unwrap(),
            ..txn("current", 0, "U1", "1234", "D1")
        };
        let (score, rules) = score(&current, &history, &config);
        assert!(score >= 80.0, "expected high velocity score, got {score}");
        assert!(rules.iter().any(|r| r.starts_with("VELOCITY_")));
    }

    #[test]
    fn no_history_scores_zero() {
        let config = RiskConfig::default();
        let history = HistoryIndex::new();
        let current = txn("current", 0, "U1", "1234", "D1");
        let (score, rules) = score(&current, &history, &config);
        assert_eq!(score, 0.0);
        assert!(rules.is_empty());
    }
}

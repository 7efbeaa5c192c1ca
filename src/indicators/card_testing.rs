//! Card-testing indicator (§4.5): flags a card probed with several small charges
//! shortly before a large one.

use crate::config::RiskConfig;
use crate::history::HistoryIndex;
use crate::types::Transaction;
use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;

/// Score the card-testing indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;
    let cfg = &config.card_testing;
    let window_start = t0 - Duration::hours(cfg.lookback_hours);

    let recent: Vec<f64> = history
        .by_card(&txn.card_last4)
        .filter(|p| p.timestamp > window_start && p.timestamp < t0)
        .map(|p| p.amount.to_f64().unwrap_or(0.0))
        .collect();

    if recent.is_empty() {
        return (0.0, Vec::new());
    }

    let small_threshold = txn.currency.card_testing_small_threshold().to_f64().unwrap_or(300.0);
    let small: Vec<f64> = recent.into_iter().filter(|a| *a < small_threshold).collect();
    let n_small = small.len();
    let amount = txn.amount.to_f64().unwrap_or(0.0);

    if n_small >= cfg.small_count_threshold {
        let avg_small = if n_small > 0 { small.iter().sum::<f64>() / n_small as f64 } else { 1.0 };
        if amount > avg_small * cfg.confirmed_multiplier {
            let multiplier = amount / avg_small;
            return (
                95.0,
                vec![format!(
                    "CARD_TESTING_CONFIRMED: {n_small} small txns (avg={avg_small:.0}) then large={amount:.0} ({multiplier:.0}x multiplier)"
                )],
            );
        }
        if amount > avg_small * cfg.likely_multiplier {
            return (
                70.0,
                vec![format!("CARD_TESTING_LIKELY: {n_small} small txns then medium-large={amount:.0}")],
            );
        }
        return (
            50.0,
            vec![format!(
                "CARD_TESTING_PROBING: {n_small} small transactions from card ****{}",
                txn.card_last4
            )],
        );
    }

    if n_small >= cfg.possible_small_count && amount > small_threshold * cfg.possible_multiplier {
        return (
            40.0,
            vec![format!("CARD_TESTING_POSSIBLE: {n_small} small txns before large={amount:.0}")],
        );
    }

    (0.0, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, PaymentStatus};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn txn(id: &str, minute: u32, amount: i64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(2025, 2, 15, 10, minute.min(59), 0).unwrap(),
            user_id: "U1".to_string(),
            driver_id: "D1".to_string(),
            card_last4: "1234".to_string(),
            device_id: "DEV1".to_string(),
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
    fn small_probes_then_large_charge_scores_high() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        for i in 0..4 {
            history.push(txn(&format!("p{i}"), 10 + i, 100));
        }
        let current = txn("current", 50, 12_000);
        let (score, rules) = score(&current, &history, &config);
        assert!(score >= 70.0, "expected high card-testing score, got {score}");
        assert!(rules.iter().any(|r| r.starts_with("CARD_TESTING_")));
    }

    #[test]
    fn no_recent_card_history_scores_zero() {
        let config = RiskConfig::default();
        let history = HistoryIndex::new();
        let current = txn("current", 50, 12_000);
        let (score, rules) = score(&current, &history, &config);
        assert_eq!(score, 0.0);
        assert!(rules.is_empty());
    }
}

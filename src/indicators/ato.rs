//! Account-takeover indicator (§4.7): flags a user transacting with a card, device,
//! country, or city it hasn't seen in the last 30 days.

use crate::config::RiskConfig;
use crate::history::HistoryIndex;
use crate::types::Transaction;
use chrono::Duration;
use std::collections::HashSet;

/// Score the account-takeover indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;
    let cfg = &config.ato;
    let window_start = t0 - Duration::days(cfg.lookback_days);

    let window: Vec<&Transaction> = history
        .by_user(&txn.user_id)
        .filter(|p| p.timestamp > window_start && p.timestamp < t0)
        .collect();
    if window.is_empty() {
        return (0.0, Vec::new());
    }

    let known_cards: HashSet<&str> = window.iter().map(|p| p.card_last4.as_str()).collect();
    let known_devices: HashSet<&str> = window.iter().map(|p| p.device_id.as_str()).collect();
    let known_countries: HashSet<&str> = window.iter().map(|p| p.pickup_country.as_str()).collect();
    let known_cities: HashSet<&str> = window.iter().map(|p| p.pickup_city.as_str()).collect();

    let is_new_card = !known_cards.contains(txn.card_last4.as_str());
    let is_new_device = !known_devices.contains(txn.device_id.as_str());
    let is_new_country = !known_countries.contains(txn.pickup_country.as_str());
    let is_new_city = !known_cities.contains(txn.pickup_city.as_str());

    let mut score: f64 = 0.0;
    let mut triggered = Vec::new();

    if is_new_card && is_new_country {
        score = 85.0;
        triggered.push("ATO_HIGH: new card and new country".to_string());
    } else if is_new_card && is_new_device {
        score = 70.0;
        triggered.push("ATO_NEW_CARD_DEVICE: new card and new device".to_string());
    } else if is_new_card && is_new_city {
        score = 65.0;
        triggered.push("ATO_MODERATE: new card and new city".to_string());
    } else if is_new_card {
        score = 30.0;
        triggered.push("ATO_NEW_CARD: new card".to_string());
    }

    if !is_new_card && is_new_device && is_new_country {
        score = score.max(50.0);
        triggered.push("ATO_NEW_DEVICE_COUNTRY: new device and new country on a known card".to_string());
    }

    if is_new_card {
        let uses = history
            .by_user(&txn.user_id)
            .filter(|p| p.card_last4 == txn.card_last4)
            .count()
            + 1;
        if uses >= cfg.rapid_use_min_count as usize {
            score = (score + 15.0).min(100.0);
            triggered.push(format!("ATO_RAPID_USE: {uses} uses of a new card"));
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

    fn base(
        id: &str,
        day: u32,
        card: &str,
        device: &str,
        country: &str,
        city: &str,
    ) -> Transaction {
        dated(id, 2025, 2, day, card, device, country, city)
    }

    #[allow(clippy::too_many_arguments)]
    fn dated(
        id: &str,
        year: i32,
        month: u32,
        day: u32,
        card: &str,
        device: &str,
        country: &str,
        city: &str,
    ) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            timestamp: chrono::Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap(),
            user_id: "U1".to_string(),
            driver_id: "D1".to_string(),
            card_last4: card.to_string(),
            device_id: device.to_string(),
            pickup_city: city.to_string(),
            pickup_country: country.to_string(),
            pickup_lat: 6.5244,
            pickup_lng: 3.3792,
            dropoff_city: "Lagos".to_string(),
            dropoff_lat: 6.6,
            dropoff_lng: 3.4,
            distance_km: 5.0,
            duration_minutes: 15.0,
            amount: Decimal::from(100),
            currency: Currency::Ngn,
            payment_status: PaymentStatus::Completed,
            is_fraudulent: false,
        }
    }

    #[test]
    fn new_card_and_country_scores_high() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        for day in 1..=5 {
            history.push(base(&format!("p{day}"), day, "1111", "DEV1", "NG", "Lagos"));
        }
        let current = base("current", 10, "2222", "DEV1", "KE", "Nairobi");
        let (score, rules) = score(&current, &history, &config);
        assert_eq!(score, 85.0);
        assert!(rules.iter().any(|r| r.starts_with("ATO_HIGH")));
    }

    #[test]
    fn no_history_scores_zero() {
        let config = RiskConfig::default();
        let history = HistoryIndex::new();
        let current = base("current", 10, "2222", "DEV1", "KE", "Nairobi");
        let (score, rules) = score(&current, &history, &config);
        assert_eq!(score, 0.0);
        assert!(rules.is_empty());
    }

    #[test]
    fn rapid_use_of_new_card_boosts_score() {
        let config = RiskConfig::default();
        let mut history = HistoryIndex::new();
        history.push(dated("p1", 2025, 1, 1, "1111", "DEV1", "NG", "Lagos"));
        history.push(dated("p2", 2025, 1, 2, "2222", "DEV1", "NG", "Lagos"));
        history.push(dated("p3", 2025, 1, 3, "2222", "DEV1", "NG", "Lagos"));
        history.push(dated("p4", 2025, 2, 1, "3333", "DEV1", "NG", "Lagos"));
        let current = base("current", 10, "2222", "DEV1", "NG", "Lagos");
        let (score, rules) = score(&current, &history, &config);
        assert!(score >= 30.0 + 15.0 - 0.01);
        assert!(rules.iter().any(|r| r.starts_with("ATO_RAPID_USE")));
    }
}

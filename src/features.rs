//! Feature extractor (§4.10): projects a transaction plus its indicator scores into
//! the fixed 12-element vector the supervised scorer trains and predicts on.

use crate::types::{IndicatorScores, Transaction};
use chrono::{Datelike, Timelike};
use rust_decimal::prelude::ToPrimitive;

/// Number of elements in the feature vector.
pub const FEATURE_COUNT: usize = 12;

/// Names of the feature vector's elements, in order. Used to build prediction
/// dictionaries and to label feature importances.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "velocity",
    "geographic",
    "amount_score",
    "card_testing",
    "collusion",
    "ato",
    "fraud_ring",
    "amount",
    "distance_km",
    "duration_minutes",
    "hour_of_day",
    "day_of_week",
];

/// Build the canonical 12-element feature vector for `txn` given its indicator scores.
pub fn extract(txn: &Transaction, indicators: &IndicatorScores) -> [f64; FEATURE_COUNT] {
    let hour_of_day = txn.timestamp.hour() as f64;
    let day_of_week = txn.timestamp.weekday().num_days_from_monday() as f64;
    [
        indicators.velocity,
        indicators.geographic,
        indicators.amount,
        indicators.card_testing,
        indicators.collusion,
        indicators.ato,
        indicators.fraud_ring,
        txn.amount.to_f64().unwrap_or(0.0),
        txn.distance_km,
        txn.duration_minutes,
        hour_of_day,
        day_of_week,
    ]
}

//! Parses wire-format transactions (string timestamps) into the domain `Transaction`
//! type, which carries a `chrono::DateTime<Utc>` and can therefore never represent an
//! unparseable timestamp (§7: BadTimestamp is fatal for the current transaction).

use crate::error::{Error, Result};
use crate::types::{Currency, PaymentStatus, Transaction};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A transaction exactly as it arrives over the wire: same fields as `Transaction`,
/// but with a string timestamp that may or may not parse.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    /// Unique transaction identifier
    pub transaction_id: String,
    /// ISO-8601 timestamp; may be RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS`
    pub timestamp: String,
    /// Rider identifier
    pub user_id: String,
    /// Driver identifier
    pub driver_id: String,
    /// Last four digits of the payment card
    pub card_last4: String,
    /// Device fingerprint
    pub device_id: String,
    /// Pickup city name
    pub pickup_city: String,
    /// Pickup ISO country code
    pub pickup_country: String,
    /// Pickup latitude
    pub pickup_lat: f64,
    /// Pickup longitude
    pub pickup_lng: f64,
    /// Dropoff city name
    pub dropoff_city: String,
    /// Dropoff latitude
    pub dropoff_lat: f64,
    /// Dropoff longitude
    pub dropoff_lng: f64,
    /// Trip distance in kilometers
    pub distance_km: f64,
    /// Trip duration in minutes
    pub duration_minutes: f64,
    /// Fare amount, always non-negative
    pub amount: Decimal,
    /// ISO-ish currency code, e.g. `"NGN"`
    pub currency: String,
    /// Payment processing status
    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,
    /// Ground-truth fraud label; only consumed by the supervised trainer
    #[serde(default)]
    pub is_fraudulent: bool,
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::Completed
}

/// Parse a timestamp the way the engine parses timestamps everywhere: RFC 3339 first,
/// falling back to a naive `YYYY-MM-DDTHH:MM:SS` interpreted as UTC (the source system's
/// `datetime.fromisoformat` never carried an offset).
pub fn parse_timestamp(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| e.to_string())
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = Error;

    fn try_from(raw: RawTransaction) -> Result<Self> {
        let timestamp = parse_timestamp(&raw.timestamp).map_err(|reason| Error::BadTimestamp {
            transaction_id: raw.transaction_id.clone(),
            reason,
        })?;

        Ok(Transaction {
            transaction_id: raw.transaction_id,
            timestamp,
            user_id: raw.user_id,
            driver_id: raw.driver_id,
            card_last4: raw.card_last4,
            device_id: raw.device_id,
            pickup_city: raw.pickup_city,
            pickup_country: raw.pickup_country,
            pickup_lat: raw.pickup_lat,
            pickup_lng: raw.pickup_lng,
            dropoff_city: raw.dropoff_city,
            dropoff_lat: raw.dropoff_lat,
            dropoff_lng: raw.dropoff_lng,
            distance_km: raw.distance_km,
            duration_minutes: raw.duration_minutes,
            amount: raw.amount,
            currency: Currency::from(raw.currency.as_str()),
            payment_status: raw.payment_status,
            is_fraudulent: raw.is_fraudulent,
        })
    }
}

//! Core data model for the risk engine: transactions, indicator scores, and assessments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement currency. `Other` keeps the type open to corridors beyond the three
/// the source system shipped with, without widening every match arm in the detectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Currency {
    /// Nigerian naira
    Ngn,
    /// Kenyan shilling
    Kes,
    /// South African rand
    Zar,
    /// Any other ISO 4217 code, carried verbatim.
    Other(String),
}

impl Currency {
    /// The ISO-ish code this currency serializes as.
    pub fn code(&self) -> &str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Kes => "KES",
            Currency::Zar => "ZAR",
            Currency::Other(code) => code,
        }
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        match code {
            "NGN" => Currency::Ngn,
            "KES" => Currency::Kes,
            "ZAR" => Currency::Zar,
            other => Currency::Other(other.to_string()),
        }
    }
}

impl Serialize for Currency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Currency::from(code.as_str()))
    }
}

impl Currency {
    /// The "small transaction" threshold used by the card-testing detector (§4.5).
    pub fn card_testing_small_threshold(&self) -> Decimal {
        match self {
            Currency::Ngn => Decimal::from(300),
            Currency::Kes => Decimal::from(150),
            Currency::Zar => Decimal::from(30),
            Currency::Other(_) => Decimal::from(300),
        }
    }
}

/// Payment processing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Settled
    Completed,
    /// Awaiting settlement
    Pending,
    /// Declined
    Failed,
    /// Reversed after settlement
    Refunded,
}

/// A single ride-hailing payment transaction. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub transaction_id: String,
    /// UTC instant the transaction occurred
    pub timestamp: DateTime<Utc>,
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
    /// Settlement currency
    pub currency: Currency,
    /// Payment processing status
    pub payment_status: PaymentStatus,
    /// Ground-truth fraud label; only consumed by the supervised trainer
    pub is_fraudulent: bool,
}

/// The seven independent fraud-indicator scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IndicatorScores {
    /// Transaction-frequency indicator (§4.2)
    pub velocity: f64,
    /// Impossible-travel indicator (§4.3)
    pub geographic: f64,
    /// Amount-anomaly indicator (§4.4)
    pub amount: f64,
    /// Small-then-large probing indicator (§4.5)
    pub card_testing: f64,
    /// Driver-rider collusion indicator (§4.6)
    pub collusion: f64,
    /// Account-takeover indicator (§4.7)
    pub ato: f64,
    /// Shared-device fraud-ring indicator (§4.8)
    pub fraud_ring: f64,
}

impl IndicatorScores {
    /// The largest of the seven scores.
    pub fn max(&self) -> f64 {
        [
            self.velocity,
            self.geographic,
            self.amount,
            self.card_testing,
            self.collusion,
            self.ato,
            self.fraud_ring,
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }

    /// How many of the seven scores are at or above `threshold`.
    pub fn count_at_least(&self, threshold: f64) -> usize {
        [
            self.velocity,
            self.geographic,
            self.amount,
            self.card_testing,
            self.collusion,
            self.ato,
            self.fraud_ring,
        ]
        .into_iter()
        .filter(|v| *v >= threshold)
        .count()
    }
}

/// Three-level risk classification derived from `risk_score` by configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Below `low_risk_threshold`
    LowRisk,
    /// At or above `low_risk_threshold`, below `high_risk_threshold`
    MediumRisk,
    /// At or above `high_risk_threshold`
    HighRisk,
}

/// The per-transaction output of the risk engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Echoes `Transaction::transaction_id`
    pub transaction_id: String,
    /// Final 0-100 risk score
    pub risk_score: u8,
    /// Risk classification derived from `risk_score`
    pub risk_level: RiskLevel,
    /// The seven indicator scores that fed the aggregator
    pub indicators: IndicatorScores,
    /// Supervised-model fraud probability (0-100), if a model is active
    pub ml_score: Option<f64>,
    /// Ordered list of `TAG: description` rule strings, in detector order
    pub triggered_rules: Vec<String>,
    /// Wall-clock instant the assessment was produced
    pub processed_at: DateTime<Utc>,
}

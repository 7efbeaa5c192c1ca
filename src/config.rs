//! Tunable thresholds and weights (§6). Every detector and the aggregator reads its
//! thresholds from here rather than hard-coding them, so callers can override behavior
//! without forking the crate.

use crate::error::{Error, Result};

/// Velocity-detector window-count thresholds (§4.2).
#[derive(Debug, Clone)]
pub struct VelocityThresholds {
    /// `m1 >= moderate` fires `VELOCITY_MODERATE`
    pub moderate: u32,
    /// `m1 >= high` fires `VELOCITY_HIGH`
    pub high: u32,
    /// `m1 >= very_high` fires `VELOCITY_VERY_HIGH`
    pub very_high: u32,
    /// `m1 >= extreme` fires `VELOCITY_EXTREME`
    pub extreme: u32,
    /// `m2 >= two_hour_high` fires `VELOCITY_2H_HIGH`
    pub two_hour_high: u32,
    /// `user_24h >= day_high` fires `VELOCITY_24H_HIGH`
    pub day_high: u32,
}

impl Default for VelocityThresholds {
    fn default() -> Self {
        Self {
            moderate: 3,
            high: 6,
            very_high: 8,
            extreme: 10,
            two_hour_high: 10,
            day_high: 15,
        }
    }
}

/// Geographic-detector speed/distance thresholds (§4.3).
#[derive(Debug, Clone)]
pub struct SpeedThresholds {
    /// km/h above which travel is flagged impossible
    pub impossible_kmh: f64,
    /// km/h above which travel is flagged suspicious
    pub suspicious_kmh: f64,
    /// minimum distance (km) for the speed clauses to apply
    pub min_distance_km: f64,
    /// max hours between a country change to count as suspicious
    pub country_change_window_hours: i64,
}

impl Default for SpeedThresholds {
    fn default() -> Self {
        Self {
            impossible_kmh: 900.0,
            suspicious_kmh: 500.0,
            min_distance_km: 100.0,
            country_change_window_hours: 3,
        }
    }
}

/// Amount-detector z-score thresholds (§4.4).
#[derive(Debug, Clone)]
pub struct AmountThresholds {
    /// z-score threshold for `AMOUNT_EXTREME` with personal history
    pub personal_extreme: f64,
    /// z-score threshold for `AMOUNT_HIGH` with personal history
    pub personal_high: f64,
    /// z-score threshold for `AMOUNT_ELEVATED` with personal history
    pub personal_elevated: f64,
    /// z-score threshold for `AMOUNT_EXTREME` falling back to population history
    pub population_extreme: f64,
    /// z-score threshold for `AMOUNT_HIGH` falling back to population history
    pub population_high: f64,
    /// z-score threshold for `AMOUNT_ELEVATED` falling back to population history
    pub population_elevated: f64,
    /// minimum personal history size before using personal thresholds
    pub min_personal_history: usize,
    /// minimum population history size before scoring at all
    pub min_population_history: usize,
}

impl Default for AmountThresholds {
    fn default() -> Self {
        Self {
            personal_extreme: 3.0,
            personal_high: 2.0,
            personal_elevated: 1.5,
            population_extreme: 4.0,
            population_high: 3.0,
            population_elevated: 2.5,
            min_personal_history: 5,
            min_population_history: 10,
        }
    }
}

/// Card-testing-detector thresholds (§4.5).
#[derive(Debug, Clone)]
pub struct CardTestingThresholds {
    /// lookback window for "recent" card transactions
    pub lookback_hours: i64,
    /// minimum small-transaction count for the confirmed/likely/probing clauses
    pub small_count_threshold: usize,
    /// amount multiplier over `avg_small` for `CARD_TESTING_CONFIRMED`
    pub confirmed_multiplier: f64,
    /// amount multiplier over `avg_small` for `CARD_TESTING_LIKELY`
    pub likely_multiplier: f64,
    /// minimum small-transaction count for `CARD_TESTING_POSSIBLE`
    pub possible_small_count: usize,
    /// amount multiplier over the currency's small threshold for `CARD_TESTING_POSSIBLE`
    pub possible_multiplier: f64,
}

impl Default for CardTestingThresholds {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            small_count_threshold: 3,
            confirmed_multiplier: 10.0,
            likely_multiplier: 5.0,
            possible_small_count: 2,
            possible_multiplier: 10.0,
        }
    }
}

/// Collusion-detector thresholds (§4.6).
#[derive(Debug, Clone)]
pub struct CollusionThresholds {
    /// lookback window in days
    pub lookback_days: i64,
    /// pair count for `COLLUSION_HIGH`
    pub high: u32,
    /// pair count for `COLLUSION_MODERATE`
    pub moderate: u32,
    /// circular-route count for the `COLLUSION_CIRCULAR` boost
    pub circular_count: u32,
    /// pair count required for the `COLLUSION_CIRCULAR_CURRENT` boost
    pub circular_current_min_pairs: u32,
    /// pickup-to-dropoff distance (km) below which a trip counts as circular
    pub circular_distance_km: f64,
}

impl Default for CollusionThresholds {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            high: 8,
            moderate: 5,
            circular_count: 3,
            circular_current_min_pairs: 3,
            circular_distance_km: 0.5,
        }
    }
}

/// Account-takeover-detector thresholds (§4.7).
#[derive(Debug, Clone)]
pub struct AtoThresholds {
    /// lookback window in days
    pub lookback_days: i64,
    /// minimum transactions on a new card for `ATO_RAPID_USE`
    pub rapid_use_min_count: u32,
}

impl Default for AtoThresholds {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            rapid_use_min_count: 3,
        }
    }
}

/// Fraud-ring-detector thresholds (§4.8).
#[derive(Debug, Clone)]
pub struct FraudRingThresholds {
    /// lookback window in days
    pub lookback_days: i64,
    /// distinct-user count for `FRAUD_RING_HIGH`
    pub high_users: usize,
    /// distinct-user count for `FRAUD_RING_MODERATE`
    pub moderate_users: usize,
    /// distinct-user count for `FRAUD_RING_LOW`
    pub low_users: usize,
    /// fraction of amounts within 20% of the mean required for `FRAUD_RING_SIMILAR_AMOUNTS`
    pub similar_amount_fraction: f64,
    /// minimum parseable timestamps for the time-cluster check
    pub time_cluster_min_count: usize,
    /// max span (hours) for `FRAUD_RING_TIME_CLUSTER`
    pub time_cluster_span_hours: f64,
}

impl Default for FraudRingThresholds {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            high_users: 4,
            moderate_users: 3,
            low_users: 2,
            similar_amount_fraction: 0.7,
            time_cluster_min_count: 5,
            time_cluster_span_hours: 24.0,
        }
    }
}

/// Rule-aggregator weights and floor boosts (§4.9).
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// weight applied to the velocity indicator
    pub weight_velocity: f64,
    /// weight applied to the geographic indicator
    pub weight_geographic: f64,
    /// weight applied to the amount indicator
    pub weight_amount: f64,
    /// weight applied to the card-testing indicator
    pub weight_card_testing: f64,
    /// weight applied to the collusion indicator
    pub weight_collusion: f64,
    /// weight applied to the account-takeover indicator
    pub weight_ato: f64,
    /// weight applied to the fraud-ring indicator
    pub weight_fraud_ring: f64,
    /// max-indicator threshold for the 80-floor boost
    pub max_indicator_floor_80: f64,
    /// max-indicator threshold for the 65-floor boost
    pub max_indicator_floor_65: f64,
    /// "strong indicator" threshold counted for the strong-count boosts
    pub strong_indicator_threshold: f64,
    /// strong-indicator count for the 70-floor boost
    pub strong_count_floor_70: usize,
    /// strong-indicator count for the 55-floor boost
    pub strong_count_floor_55: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            weight_velocity: 0.25,
            weight_geographic: 0.25,
            weight_amount: 0.15,
            weight_card_testing: 0.20,
            weight_collusion: 0.05,
            weight_ato: 0.05,
            weight_fraud_ring: 0.05,
            max_indicator_floor_80: 90.0,
            max_indicator_floor_65: 70.0,
            strong_indicator_threshold: 20.0,
            strong_count_floor_70: 3,
            strong_count_floor_55: 2,
        }
    }
}

/// Top-level configuration for the risk engine. Threaded through every detector, the
/// aggregator, and the orchestrator.
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// lower bound of the medium_risk band
    pub low_risk_threshold: u8,
    /// lower bound of the high_risk band
    pub high_risk_threshold: u8,
    /// maximum transactions per orchestrator call
    pub batch_size: usize,
    /// velocity detector thresholds
    pub velocity: VelocityThresholds,
    /// geographic detector speed thresholds
    pub speed: SpeedThresholds,
    /// amount detector z-score thresholds
    pub amount: AmountThresholds,
    /// card-testing detector thresholds
    pub card_testing: CardTestingThresholds,
    /// collusion detector thresholds
    pub collusion: CollusionThresholds,
    /// account-takeover detector thresholds
    pub ato: AtoThresholds,
    /// fraud-ring detector thresholds
    pub fraud_ring: FraudRingThresholds,
    /// aggregator weights and floor boosts
    pub aggregator: AggregatorConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            low_risk_threshold: 30,
            high_risk_threshold: 60,
            batch_size: 10,
            velocity: VelocityThresholds::default(),
            speed: SpeedThresholds::default(),
            amount: AmountThresholds::default(),
            card_testing: CardTestingThresholds::default(),
            collusion: CollusionThresholds::default(),
            ato: AtoThresholds::default(),
            fraud_ring: FraudRingThresholds::default(),
            aggregator: AggregatorConfig::default(),
        }
    }
}

impl RiskConfig {
    /// Validate the threshold relationships the aggregator and orchestrator depend on.
    pub fn validate(&self) -> Result<()> {
        if self.low_risk_threshold > 100 || self.high_risk_threshold > 100 {
            return Err(Error::InvalidConfig(
                "risk thresholds must be in [0, 100]".to_string(),
            ));
        }
        if self.low_risk_threshold >= self.high_risk_threshold {
            return Err(Error::InvalidConfig(
                "low_risk_threshold must be strictly less than high_risk_threshold".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch_size must be nonzero".to_string()));
        }
        Ok(())
    }

    /// Derive the risk level for a final score under this config's thresholds.
    pub fn risk_level(&self, score: u8) -> crate::types::RiskLevel {
        use crate::types::RiskLevel;
        if score >= self.high_risk_threshold {
            RiskLevel::HighRisk
        } else if score >= self.low_risk_threshold {
            RiskLevel::MediumRisk
        } else {
            RiskLevel::LowRisk
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        RiskConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let cfg = RiskConfig {
            low_risk_threshold: 70,
            high_risk_threshold: 60,
            ..RiskConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let cfg = RiskConfig {
            batch_size: 0,
            ..RiskConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}

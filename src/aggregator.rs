//! Rule aggregator (§4.9): combines the seven indicator scores into a single 0-100
//! rule-based risk score and level.

use crate::config::RiskConfig;
use crate::types::{IndicatorScores, RiskLevel};

/// Weighted-sum the indicator scores, apply floor boosts, and derive a risk level.
pub fn aggregate(indicators: &IndicatorScores, config: &RiskConfig) -> (u8, RiskLevel) {
    let agg = &config.aggregator;

    let weighted = indicators.velocity * agg.weight_velocity
        + indicators.geographic * agg.weight_geographic
        + indicators.amount * agg.weight_amount
        + indicators.card_testing * agg.weight_card_testing
        + indicators.collusion * agg.weight_collusion
        + indicators.ato * agg.weight_ato
        + indicators.fraud_ring * agg.weight_fraud_ring;

    let mut score = weighted.round();

    let max_indicator = indicators.max();
    if max_indicator >= agg.max_indicator_floor_80 {
        score = score.max(80.0);
    } else if max_indicator >= agg.max_indicator_floor_65 {
        score = score.max(65.0);
    }

    let strong_count = indicators.count_at_least(agg.strong_indicator_threshold);
    if strong_count >= agg.strong_count_floor_70 {
        score = score.max(70.0);
    } else if strong_count >= agg.strong_count_floor_55 {
        score = score.max(55.0);
    }

    let score = score.clamp(0.0, 100.0) as u8;
    (score, config.risk_level(score))
}

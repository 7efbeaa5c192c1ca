//! Hybrid combiner (§4.12): blends the rule-based score with the supervised model's
//! fraud probability when a model is active.

use crate::config::RiskConfig;
use crate::types::RiskLevel;

const RULE_WEIGHT: f64 = 0.4;
const ML_WEIGHT: f64 = 0.6;

/// Combine a rule score with an optional ML score, re-deriving the risk level from
/// whichever score wins.
pub fn combine(rule_score: u8, rule_level: RiskLevel, ml_score: Option<f64>, config: &RiskConfig) -> (u8, RiskLevel) {
    match ml_score {
        None => (rule_score, rule_level),
        Some(ml) => {
            let blended = (RULE_WEIGHT * rule_score as f64 + ML_WEIGHT * ml).round().clamp(0.0, 100.0) as u8;
            (blended, config.risk_level(blended))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_model_passes_rule_score_through() {
        let config = RiskConfig::default();
        let (score, level) = combine(42, RiskLevel::MediumRisk, None, &config);
        assert_eq!(score, 42);
        assert_eq!(level, RiskLevel::MediumRisk);
    }

    #[test]
    fn blends_rule_and_ml_scores() {
        let config = RiskConfig::default();
        let (score, level) = combine(20, RiskLevel::LowRisk, Some(90.0), &config);
        assert_eq!(score, 62);
        assert_eq!(level, RiskLevel::HighRisk);
    }
}

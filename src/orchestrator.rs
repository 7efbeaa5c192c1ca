//! Batch orchestrator (§4.13): parses a batch of wire-format transactions, runs each
//! through the seven detectors, the aggregator, and the hybrid combiner, threading a
//! growing history through the whole run.

use crate::aggregator;
use crate::config::RiskConfig;
use crate::error::Result;
use crate::history::HistoryIndex;
use crate::hybrid;
use crate::indicators::{amount, ato, card_testing, collusion, fraud_ring, geographic, velocity};
use crate::ingest::RawTransaction;
use crate::model_store::ModelStore;
use crate::types::{IndicatorScores, RiskAssessment, Transaction};
use tracing::{info, info_span};

/// Run `batch` through the engine in order, starting from `history`, mutating it in
/// place as each transaction is scored and appended. An input larger than
/// `config.batch_size` is chunked into consecutive sub-batches rather than rejected;
/// history keeps growing across chunk boundaries so later chunks see earlier ones.
///
/// A transaction whose timestamp cannot be parsed yields `Err(Error::BadTimestamp)` at
/// its position in the output and is never appended to history or scored; it does not
/// abort the rest of the batch, whose other transactions still produce assessments.
pub fn run_batch(
    batch: Vec<RawTransaction>,
    history: &mut HistoryIndex,
    config: &RiskConfig,
    model_store: &ModelStore,
) -> Vec<Result<RiskAssessment>> {
    let span = info_span!(
        "risk_batch",
        batch_len = batch.len(),
        batch_size = config.batch_size,
        seed_history_len = history.len()
    );
    let _guard = span.enter();

    let mut outcomes = Vec::with_capacity(batch.len());
    for chunk in batch.chunks(config.batch_size.max(1)) {
        let chunk_span = info_span!("risk_batch_chunk", chunk_len = chunk.len());
        let _chunk_guard = chunk_span.enter();

        for raw in chunk {
            let txn: Transaction = match raw.clone().try_into() {
                Ok(txn) => txn,
                Err(err) => {
                    info!(transaction_id = %raw.transaction_id, error = %err, "bad timestamp, skipping transaction");
                    outcomes.push(Err(err));
                    continue;
                }
            };

            let assessment = score_one(&txn, history, config, model_store);

            info!(
                transaction_id = %assessment.transaction_id,
                risk_score = assessment.risk_score,
                risk_level = ?assessment.risk_level,
                "transaction scored"
            );

            history.push(txn);
            outcomes.push(Ok(assessment));
        }
    }

    outcomes
}

fn score_one(
    txn: &Transaction,
    history: &HistoryIndex,
    config: &RiskConfig,
    model_store: &ModelStore,
) -> RiskAssessment {
    let mut triggered_rules = Vec::new();

    let (velocity_score, velocity_rules) = velocity::score(txn, history, config);
    let (geographic_score, geographic_rules) = geographic::score(txn, history, config);
    let (amount_score, amount_rules) = amount::score(txn, history, config);
    let (card_testing_score, card_testing_rules) = card_testing::score(txn, history, config);
    let (collusion_score, collusion_rules) = collusion::score(txn, history, config);
    let (ato_score, ato_rules) = ato::score(txn, history, config);
    let (fraud_ring_score, fraud_ring_rules) = fraud_ring::score(txn, history, config);

    for rule in velocity_rules
        .iter()
        .chain(&geographic_rules)
        .chain(&amount_rules)
        .chain(&card_testing_rules)
        .chain(&collusion_rules)
        .chain(&ato_rules)
        .chain(&fraud_ring_rules)
    {
        info!(transaction_id = %txn.transaction_id, rule = %rule, "rule triggered");
    }

    triggered_rules.extend(velocity_rules);
    triggered_rules.extend(geographic_rules);
    triggered_rules.extend(amount_rules);
    triggered_rules.extend(card_testing_rules);
    triggered_rules.extend(collusion_rules);
    triggered_rules.extend(ato_rules);
    triggered_rules.extend(fraud_ring_rules);

    let indicators = IndicatorScores {
        velocity: velocity_score,
        geographic: geographic_score,
        amount: amount_score,
        card_testing: card_testing_score,
        collusion: collusion_score,
        ato: ato_score,
        fraud_ring: fraud_ring_score,
    };

    let (rule_score, rule_level) = aggregator::aggregate(&indicators, config);

    let ml_score = model_store.get().map(|model| {
        let features = crate::features::extract(txn, &indicators);
        let mut map = std::collections::HashMap::new();
        for (name, value) in crate::features::FEATURE_NAMES.iter().zip(features) {
            map.insert(name.to_string(), value);
        }
        model.predict(&map)
    });

    let (risk_score, risk_level) = hybrid::combine(rule_score, rule_level, ml_score, config);

    RiskAssessment {
        transaction_id: txn.transaction_id.clone(),
        risk_score,
        risk_level,
        indicators,
        ml_score,
        triggered_rules,
        processed_at: chrono::Utc::now(),
    }
}

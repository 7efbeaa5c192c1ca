//! Amount indicator (§4.4): flags transactions whose size is a statistical outlier
//! against the user's own history, or the currency-wide population when personal
//! history is too thin.

use crate::config::RiskConfig;
use crate::history::HistoryIndex;
use crate::types::Transaction;
use rust_decimal::prelude::ToPrimitive;

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = if variance > 0.0 { variance.sqrt() } else { 1.0 };
    (mean, std)
}

/// Score the amount indicator for `txn` against `history`.
pub fn score(txn: &Transaction, history: &HistoryIndex, config: &RiskConfig) -> (f64, Vec<String>) {
    let t0 = txn.timestamp;
    let cfg = &config.amount;

    let mut personal: Vec<f64> = history
        .by_user(&txn.user_id)
        .filter(|p| p.currency == txn.currency && p.timestamp < t0)
        .map(|p| p.amount.to_f64().unwrap_or(0.0))
        .collect();

    let using_population;
    let sample = if personal.len() >= cfg.min_personal_history {
        using_population = false;
        std::mem::take(&mut personal)
    } else {
        let population: Vec<f64> = history
            .all()
            .iter()
            .filter(|t| t.currency == txn.currency)
            .map(|t| t.amount.to_f64().unwrap_or(0.0))
            .collect();
        if population.len() < cfg.min_population_history {
            return (0.0, Vec::new());
        }
        using_population = true;
        population
    };

    let (mean, std) = mean_std(&sample);
    let amount = txn.amount.to_f64().unwrap_or(0.0);
    let z = if std > 0.0 { (amount - mean) / std } else { 0.0 };

    let (extreme, high, elevated) = if using_population {
        (cfg.population_extreme, cfg.population_high, cfg.population_elevated)
    } else {
        (cfg.personal_extreme, cfg.personal_high, cfg.personal_elevated)
    };

    if z > extreme {
        (80.0, vec![format!("AMOUNT_EXTREME: z-score={z:.1}, amount={amount} vs avg={mean:.0}")])
    } else if z > high {
        (50.0, vec![format!("AMOUNT_HIGH: z-score={z:.1}, amount={amount} vs avg={mean:.0}")])
    } else if z > elevated {
        (30.0, vec![format!("AMOUNT_ELEVATED: z-score={z:.1}, amount={amount} vs avg={mean:.0}")])
    } else {
        (0.0, Vec::new())
    }
}

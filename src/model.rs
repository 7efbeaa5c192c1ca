//! Supervised scorer (§4.11): a logistic-regression classifier over the 12-element
//! feature vector, trained with a seeded stratified split and minority oversampling
//! to approximate the source system's `class_weight="balanced"` random forest.

use crate::error::{Error, Result};
use crate::features::{self, FEATURE_COUNT, FEATURE_NAMES};
use crate::types::{IndicatorScores, Transaction};
use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

const SPLIT_SEED: u64 = 42;
const TRAIN_FRACTION: f64 = 0.8;
/// Minimum labeled transactions required to train (§4.11, §7 `InsufficientData`).
const MIN_TRAINING_SAMPLES: usize = 50;

/// Precision/recall/F1/accuracy/AUC and supporting detail for a trained model.
#[derive(Debug, Clone)]
pub struct TrainingMetrics {
    /// True positives over true positives plus false positives.
    pub precision: f64,
    /// True positives over true positives plus false negatives.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Fraction of the test fold classified correctly.
    pub accuracy: f64,
    /// `[[true_negatives, false_positives], [false_negatives, true_positives]]`
    pub confusion_matrix: [[usize; 2]; 2],
    /// Normalized `|coefficient|` per feature name, summing to 1.
    pub feature_importance: HashMap<String, f64>,
    /// Area under the ROC curve on the test fold.
    pub roc_auc: f64,
    /// `(false_positive_rate, true_positive_rate)` points of the ROC curve.
    pub roc_points: Vec<(f64, f64)>,
    /// Number of samples held out as the test fold.
    pub test_size: usize,
    /// Number of samples used to fit the model, after minority oversampling.
    pub train_size: usize,
}

/// A trained fraud classifier plus the feature scaler it was fit with.
pub struct FraudModel {
    fitted: FittedLogisticRegression<f64, usize>,
    mean: [f64; FEATURE_COUNT],
    std: [f64; FEATURE_COUNT],
    // `linfa_logistic` treats whichever class label appears first in the training
    // targets as positive, not the numerically larger one; this tracks whether that
    // ended up being 0 (not-fraud) so probabilities can be flipped to mean P(fraud).
    invert: bool,
}

fn fraud_probability(fitted: &FittedLogisticRegression<f64, usize>, invert: bool, x: &Array2<f64>) -> Array1<f64> {
    let probs = fitted.predict_probabilities(x);
    if invert {
        probs.mapv(|p| 1.0 - p)
    } else {
        probs
    }
}

fn standardize_fit(x: &[[f64; FEATURE_COUNT]]) -> ([f64; FEATURE_COUNT], [f64; FEATURE_COUNT]) {
    let n = x.len() as f64;
    let mut mean = [0.0; FEATURE_COUNT];
    let mut std = [0.0; FEATURE_COUNT];
    for row in x {
        for (i, v) in row.iter().enumerate() {
            mean[i] += v;
        }
    }
    for m in mean.iter_mut() {
        *m /= n;
    }
    for row in x {
        for (i, v) in row.iter().enumerate() {
            std[i] += (v - mean[i]).powi(2);
        }
    }
    for s in std.iter_mut() {
        let variance = *s / n;
        *s = if variance > 0.0 { variance.sqrt() } else { 1.0 };
    }
    (mean, std)
}

fn standardize_apply(row: &[f64; FEATURE_COUNT], mean: &[f64; FEATURE_COUNT], std: &[f64; FEATURE_COUNT]) -> [f64; FEATURE_COUNT] {
    let mut out = [0.0; FEATURE_COUNT];
    for i in 0..FEATURE_COUNT {
        out[i] = (row[i] - mean[i]) / std[i];
    }
    out
}

fn to_array2(rows: &[[f64; FEATURE_COUNT]]) -> Array2<f64> {
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), FEATURE_COUNT), flat).expect("row length matches FEATURE_COUNT")
}

/// Stratified 80/20 split: the positive and negative classes are shuffled and split
/// independently with the fixed seed, then combined, so both folds preserve the
/// original class ratio.
fn stratified_split(labels: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(SPLIT_SEED);

    let mut positives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 1).collect();
    let mut negatives: Vec<usize> = (0..labels.len()).filter(|&i| labels[i] == 0).collect();
    positives.shuffle(&mut rng);
    negatives.shuffle(&mut rng);

    let pos_train_n = ((positives.len() as f64) * TRAIN_FRACTION).round() as usize;
    let neg_train_n = ((negatives.len() as f64) * TRAIN_FRACTION).round() as usize;

    let mut train: Vec<usize> = positives[..pos_train_n].to_vec();
    train.extend_from_slice(&negatives[..neg_train_n]);
    let mut test: Vec<usize> = positives[pos_train_n..].to_vec();
    test.extend_from_slice(&negatives[neg_train_n..]);

    (train, test)
}

/// Oversample the minority class in `indices` (drawn from `labels`) up to parity with
/// the majority class, cycling through minority samples with the fixed seed.
fn oversample_minority(indices: &[usize], labels: &[usize]) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(SPLIT_SEED);

    let positives: Vec<usize> = indices.iter().copied().filter(|&i| labels[i] == 1).collect();
    let negatives: Vec<usize> = indices.iter().copied().filter(|&i| labels[i] == 0).collect();

    let (minority, majority) = if positives.len() <= negatives.len() {
        (positives, negatives)
    } else {
        (negatives, positives)
    };

    if minority.is_empty() || majority.is_empty() {
        return indices.to_vec();
    }

    let mut oversampled = majority.clone();
    oversampled.extend_from_slice(&minority);
    let deficit = majority.len() - minority.len();
    for _ in 0..deficit {
        oversampled.push(*minority.choose(&mut rng).expect("minority is non-empty"));
    }
    oversampled.shuffle(&mut rng);
    oversampled
}

impl FraudModel {
    /// Train a classifier from labeled transactions and their indicator scores. The
    /// two slices must be aligned by index (same order as `transaction_id`s were
    /// assessed in).
    pub fn train(samples: &[(Transaction, IndicatorScores)]) -> Result<(Self, TrainingMetrics)> {
        if samples.len() < MIN_TRAINING_SAMPLES {
            return Err(Error::InsufficientData(format!(
                "need at least {MIN_TRAINING_SAMPLES} labeled transactions to train, got {}",
                samples.len()
            )));
        }

        let raw: Vec<[f64; FEATURE_COUNT]> = samples
            .iter()
            .map(|(txn, indicators)| features::extract(txn, indicators))
            .collect();
        let labels: Vec<usize> = samples.iter().map(|(txn, _)| txn.is_fraudulent as usize).collect();

        let distinct_labels = labels.iter().collect::<std::collections::HashSet<_>>().len();
        if distinct_labels < 2 {
            return Err(Error::InsufficientData(
                "training data must contain both fraud and non-fraud examples".to_string(),
            ));
        }

        let (train_idx, test_idx) = stratified_split(&labels);
        let train_idx = oversample_minority(&train_idx, &labels);

        let train_raw: Vec<[f64; FEATURE_COUNT]> = train_idx.iter().map(|&i| raw[i]).collect();
        let (mean, std) = standardize_fit(&train_raw);

        let train_scaled: Vec<[f64; FEATURE_COUNT]> =
            train_raw.iter().map(|r| standardize_apply(r, &mean, &std)).collect();
        let train_labels: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();

        let x_train = to_array2(&train_scaled);
        let y_train = Array1::from_vec(train_labels);
        let dataset = Dataset::new(x_train, y_train);

        let fitted = LogisticRegression::default()
            .max_iterations(200)
            .fit(&dataset)
            .map_err(|e| Error::InsufficientData(format!("logistic regression failed to converge: {e}")))?;
        let invert = fitted.labels().pos.class != 1;

        let test_raw: Vec<[f64; FEATURE_COUNT]> = test_idx.iter().map(|&i| raw[i]).collect();
        let test_scaled: Vec<[f64; FEATURE_COUNT]> =
            test_raw.iter().map(|r| standardize_apply(r, &mean, &std)).collect();
        let test_labels: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();
        let x_test = to_array2(&test_scaled);
        let test_probs = fraud_probability(&fitted, invert, &x_test);

        let metrics = compute_metrics(&fitted, &test_labels, &test_probs, train_idx.len());

        Ok((Self { fitted, mean, std, invert }, metrics))
    }

    /// Predict a fraud probability in `[0, 100]`, rounded to one decimal place, from a
    /// feature dictionary. Missing keys default to 0.
    pub fn predict(&self, features: &HashMap<String, f64>) -> f64 {
        let mut row = [0.0; FEATURE_COUNT];
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            row[i] = *features.get(*name).unwrap_or(&0.0);
        }
        let scaled = standardize_apply(&row, &self.mean, &self.std);
        let x = to_array2(std::slice::from_ref(&scaled));
        let probs = fraud_probability(&self.fitted, self.invert, &x);
        (probs[0] * 100.0 * 10.0).round() / 10.0
    }
}

fn compute_metrics(
    fitted: &FittedLogisticRegression<f64, usize>,
    test_labels: &[usize],
    test_probs: &Array1<f64>,
    train_size: usize,
) -> TrainingMetrics {
    let mut tn = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    let mut tp = 0usize;
    for (label, prob) in test_labels.iter().zip(test_probs.iter()) {
        let predicted = if *prob >= 0.5 { 1 } else { 0 };
        match (label, predicted) {
            (0, 0) => tn += 1,
            (0, 1) => fp += 1,
            (1, 0) => fn_ += 1,
            (1, 1) => tp += 1,
            _ => unreachable!(),
        }
    }

    let precision = if tp + fp > 0 { tp as f64 / (tp + fp) as f64 } else { 0.0 };
    let recall = if tp + fn_ > 0 { tp as f64 / (tp + fn_) as f64 } else { 0.0 };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let accuracy = (tp + tn) as f64 / test_labels.len() as f64;

    let coefficients = fitted.params();
    let abs_sum: f64 = coefficients.iter().map(|c| c.abs()).sum();
    let feature_importance: HashMap<String, f64> = FEATURE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let importance = if abs_sum > 0.0 { coefficients[i].abs() / abs_sum } else { 0.0 };
            (name.to_string(), importance)
        })
        .collect();

    let (roc_points, roc_auc) = roc_curve(test_labels, test_probs);

    TrainingMetrics {
        precision,
        recall,
        f1,
        accuracy,
        confusion_matrix: [[tn, fp], [fn_, tp]],
        feature_importance,
        roc_auc,
        roc_points,
        test_size: test_labels.len(),
        train_size,
    }
}

/// Sweep the predicted-probability thresholds over the test fold to trace the ROC
/// curve and compute its area by the trapezoidal rule.
fn roc_curve(labels: &[usize], probs: &Array1<f64>) -> (Vec<(f64, f64)>, f64) {
    let positives = labels.iter().filter(|&&l| l == 1).count() as f64;
    let negatives = labels.iter().filter(|&&l| l == 0).count() as f64;
    if positives == 0.0 || negatives == 0.0 {
        return (Vec::new(), 0.5);
    }

    let mut thresholds: Vec<f64> = probs.iter().copied().collect();
    thresholds.push(0.0);
    thresholds.push(1.0);
    thresholds.sort_by(|a, b| b.partial_cmp(a).unwrap());
    thresholds.dedup();

    let mut points = Vec::with_capacity(thresholds.len());
    for t in &thresholds {
        let mut tp = 0.0;
        let mut fp = 0.0;
        for (label, prob) in labels.iter().zip(probs.iter()) {
            if *prob >= *t {
                if *label == 1 {
                    tp += 1.0;
                } else {
                    fp += 1.0;
                }
            }
        }
        points.push((fp / negatives, tp / positives));
    }

    let mut auc = 0.0;
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        auc += (x1 - x0) * (y0 + y1) / 2.0;
    }

    (points, auc.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, PaymentStatus};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn sample(id: usize, amount: i64, fraud: bool, indicator: f64) -> (Transaction, IndicatorScores) {
        let txn = Transaction {
            transaction_id: format!("t{id}"),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 15, (id % 24) as u32, 0, 0).unwrap(),
            user_id: format!("U{id}"),
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
            is_fraudulent: fraud,
        };
        let indicators = IndicatorScores {
            velocity: indicator,
            geographic: indicator,
            amount: indicator,
            card_testing: indicator,
            collusion: 0.0,
            ato: 0.0,
            fraud_ring: 0.0,
        };
        (txn, indicators)
    }

    fn dataset() -> Vec<(Transaction, IndicatorScores)> {
        let mut samples = Vec::new();
        for i in 0..35 {
            samples.push(sample(i, 1_000, false, 5.0));
        }
        for i in 35..60 {
            samples.push(sample(i, 50_000, true, 95.0));
        }
        samples
    }

    #[test]
    fn trains_and_reports_metrics_in_valid_ranges() {
        let samples = dataset();
        let (_, metrics) = FraudModel::train(&samples).unwrap();
        assert!(metrics.precision >= 0.0 && metrics.precision <= 1.0);
        assert!(metrics.recall >= 0.0 && metrics.recall <= 1.0);
        assert!(metrics.accuracy >= 0.0 && metrics.accuracy <= 1.0);
        assert!(metrics.roc_auc >= 0.0 && metrics.roc_auc <= 1.0);
        let importance_sum: f64 = metrics.feature_importance.values().sum();
        assert!((importance_sum - 1.0).abs() < 1e-6);
        assert!(metrics.test_size > 0);
    }

    #[test]
    fn predicts_high_probability_for_fraud_like_features() {
        let samples = dataset();
        let (model, _) = FraudModel::train(&samples).unwrap();
        let (txn, indicators) = sample(25, 50_000, true, 95.0);
        let vector = features::extract(&txn, &indicators);
        let mut features = HashMap::new();
        for (name, value) in FEATURE_NAMES.iter().zip(vector) {
            features.insert(name.to_string(), value);
        }
        let score = model.predict(&features);
        assert!(score > 50.0, "expected high fraud probability, got {score}");
    }

    #[test]
    fn rejects_single_class_training_data() {
        let mut samples = Vec::new();
        for i in 0..55 {
            samples.push(sample(i, 1_000, false, 5.0));
        }
        assert!(FraudModel::train(&samples).is_err());
    }

    #[test]
    fn rejects_too_few_samples() {
        let mut samples = Vec::new();
        for i in 0..20 {
            samples.push(sample(i, 1_000, false, 5.0));
        }
        for i in 20..25 {
            samples.push(sample(i, 50_000, true, 95.0));
        }
        assert!(FraudModel::train(&samples).is_err());
    }
}

//! Streaming fraud risk-assessment engine for ride-hailing payment transactions.
//!
//! Seven independent indicators (velocity, geography, amount anomaly, card testing,
//! driver collusion, account takeover, fraud rings) are combined into a rule-based
//! score, optionally blended with a supervised model's fraud probability, and
//! reported per transaction by the batch orchestrator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregator;
pub mod config;
pub mod error;
pub mod features;
pub mod geodesy;
pub mod history;
pub mod hybrid;
pub mod indicators;
pub mod ingest;
pub mod model;
pub mod model_store;
pub mod orchestrator;
pub mod types;

pub use config::RiskConfig;
pub use error::{Error, Result};
pub use history::HistoryIndex;
pub use ingest::RawTransaction;
pub use model::{FraudModel, TrainingMetrics};
pub use model_store::ModelStore;
pub use orchestrator::run_batch;
pub use types::*;

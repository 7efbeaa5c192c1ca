//! The seven independent fraud indicators (§4.2-§4.8). Each module exposes a
//! `score(txn, history, config) -> (f64, Vec<String>)` function: a 0-100 score and the
//! rule strings that fired it.

pub mod amount;
pub mod ato;
pub mod card_testing;
pub mod collusion;
pub mod fraud_ring;
pub mod geographic;
pub mod velocity;

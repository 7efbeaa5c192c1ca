//! Per-key time-ordered views over the running history (§3, §9 "Running history").
//!
//! The source system rescans a single growing list for every indicator and every
//! transaction. Detectors only ever need the slice that shares a user, card, device,
//! or (user, driver) pair with the transaction being scored, so this index keeps those
//! slices precomputed instead of filtering the full history on every call.

use crate::types::Transaction;
use std::collections::HashMap;

/// Append-only index over the transactions observed so far in the current orchestrator run.
#[derive(Debug, Default)]
pub struct HistoryIndex {
    transactions: Vec<Transaction>,
    by_user: HashMap<String, Vec<usize>>,
    by_card: HashMap<String, Vec<usize>>,
    by_device: HashMap<String, Vec<usize>>,
    by_pair: HashMap<(String, String), Vec<usize>>,
}

impl HistoryIndex {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a seed history, in the given order.
    pub fn from_seed(seed: Vec<Transaction>) -> Self {
        let mut index = Self::new();
        for txn in seed {
            index.push(txn);
        }
        index
    }

    /// Append a transaction to the running history. Only the orchestrator calls this.
    pub fn push(&mut self, txn: Transaction) {
        let position = self.transactions.len();
        self.by_user
            .entry(txn.user_id.clone())
            .or_default()
            .push(position);
        self.by_card
            .entry(txn.card_last4.clone())
            .or_default()
            .push(position);
        self.by_device
            .entry(txn.device_id.clone())
            .or_default()
            .push(position);
        self.by_pair
            .entry((txn.user_id.clone(), txn.driver_id.clone()))
            .or_default()
            .push(position);
        self.transactions.push(txn);
    }

    /// The full flat history, in enqueue order.
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Prior transactions sharing `user_id`, in enqueue order.
    pub fn by_user(&self, user_id: &str) -> impl Iterator<Item = &Transaction> {
        self.indices(&self.by_user, user_id)
    }

    /// Prior transactions sharing `card_last4`, in enqueue order.
    pub fn by_card(&self, card_last4: &str) -> impl Iterator<Item = &Transaction> {
        self.indices(&self.by_card, card_last4)
    }

    /// Prior transactions sharing `device_id`, in enqueue order.
    pub fn by_device(&self, device_id: &str) -> impl Iterator<Item = &Transaction> {
        self.indices(&self.by_device, device_id)
    }

    /// Prior transactions sharing the `(user_id, driver_id)` pair, in enqueue order.
    pub fn by_pair(&self, user_id: &str, driver_id: &str) -> impl Iterator<Item = &Transaction> {
        let key = (user_id.to_string(), driver_id.to_string());
        let idx = self.by_pair.get(&key).map(Vec::as_slice).unwrap_or(&[]);
        idx.iter().map(move |&i| &self.transactions[i])
    }

    fn indices<'a>(
        &'a self,
        map: &'a HashMap<String, Vec<usize>>,
        key: &str,
    ) -> impl Iterator<Item = &'a Transaction> {
        let idx = map.get(key).map(Vec::as_slice).unwrap_or(&[]);
        idx.iter().map(move |&i| &self.transactions[i])
    }

    /// Number of transactions observed so far.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

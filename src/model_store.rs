//! Process-wide holder for the active supervised model, behind a `parking_lot::RwLock`
//! so a freshly trained model can be swapped in atomically while requests are served.

use crate::model::FraudModel;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the currently active `FraudModel`, if any.
#[derive(Default)]
pub struct ModelStore {
    inner: RwLock<Option<Arc<FraudModel>>>,
}

impl ModelStore {
    /// Create an empty store with no active model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the active model.
    pub fn swap(&self, model: FraudModel) {
        *self.inner.write() = Some(Arc::new(model));
    }

    /// Clear the active model, reverting to rule-only scoring.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// Get a cloned handle to the active model, if one is loaded.
    pub fn get(&self) -> Option<Arc<FraudModel>> {
        self.inner.read().clone()
    }
}

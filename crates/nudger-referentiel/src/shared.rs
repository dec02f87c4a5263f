//! Atomically swappable handle on the current index generation.

use crate::index::IdentityIndex;
use nudger_core::{Gtin, RawIdentityRecord};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

/// Readers clone an `Arc` of the current index and never see a partially
/// built one; a refresh swaps in a fully built replacement.
#[derive(Debug, Clone, Default)]
pub struct SharedReferentiel {
    current: Arc<RwLock<Arc<IdentityIndex>>>,
}

impl SharedReferentiel {
    pub fn new(index: IdentityIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// Snapshot of the current generation
    pub fn current(&self) -> Arc<IdentityIndex> {
        self.current.read().clone()
    }

    /// Replace the current generation, returning the previous one
    pub fn swap(&self, index: IdentityIndex) -> Arc<IdentityIndex> {
        let next = Arc::new(index);
        info!(build_id = %next.report().build_id, uids = next.uid_count(), "swapping referentiel");
        std::mem::replace(&mut *self.current.write(), next)
    }

    pub fn resolve(&self, record: &RawIdentityRecord) -> Option<Gtin> {
        self.current().resolve(record)
    }
}

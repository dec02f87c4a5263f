//! Frozen GTIN ↔ brand uid index.
//!
//! An [`IdentityIndex`] only comes out of [`ReferentielBuilder::build`] and
//! exposes no mutation at all: once built it can be shared across threads
//! and read concurrently. A catalog refresh builds a new one.

use crate::builder::ReferentielBuilder;
use crate::radix::RadixTree;
use crate::report::BuildReport;
use crate::resolution::Resolution;
use indexmap::{IndexMap, IndexSet};
use nudger_core::{Gtin, RawIdentityRecord};
use nudger_registry::ModelSanitizer;
use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct IdentityIndex {
    /// Every brand uid observed for a GTIN
    gtin_to_uids: IndexMap<Gtin, IndexSet<String>>,
    /// Forward resolution, one GTIN per uid
    uid_to_gtin: HashMap<String, Gtin>,
    /// Same pairs as `uid_to_gtin`, prefix searchable
    prefix_index: RadixTree<Gtin>,
    report: BuildReport,
}

impl IdentityIndex {
    pub(crate) fn from_parts(
        gtin_to_uids: IndexMap<Gtin, IndexSet<String>>,
        uid_to_gtin: HashMap<String, Gtin>,
        prefix_index: RadixTree<Gtin>,
        report: BuildReport,
    ) -> Self {
        debug_assert_eq!(uid_to_gtin.len(), prefix_index.len());
        Self {
            gtin_to_uids,
            uid_to_gtin,
            prefix_index,
            report,
        }
    }

    /// Build an index in one go (sequential collect)
    pub fn build<I>(records: I, sanitizer: ModelSanitizer) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<RawIdentityRecord>,
    {
        ReferentielBuilder::new(sanitizer).collect(records).build()
    }

    /// An index that resolves nothing but direct GTINs
    pub fn empty() -> Self {
        ReferentielBuilder::new(ModelSanitizer::passthrough()).build()
    }

    /// Resolve the canonical GTIN of a record, `None` when unknown or ambiguous
    pub fn resolve(&self, record: &RawIdentityRecord) -> Option<Gtin> {
        self.resolve_detailed(record).gtin()
    }

    /// Resolve a record, telling how the GTIN was found
    pub fn resolve_detailed(&self, record: &RawIdentityRecord) -> Resolution {
        if let Some(gtin) = record.numeric_gtin() {
            return Resolution::Direct(gtin);
        }

        let Some(uid) = record.brand_uid() else {
            return Resolution::Unresolved;
        };

        if let Some(&gtin) = self.uid_to_gtin.get(uid) {
            debug!(gtin, uid, "gtin solved by uid association");
            return Resolution::Exact(gtin);
        }

        let candidates = self.prefix_gtins(uid);
        match candidates.len() {
            0 => Resolution::Unresolved,
            1 => {
                let gtin = candidates.into_iter().next().unwrap_or_default();
                info!(uid, gtin, "resolution with prefix key");
                Resolution::Prefix(gtin)
            }
            _ => {
                let gtins: Vec<Gtin> = candidates.into_iter().collect();
                warn!(uid, ?gtins, "multiple gtins found for prefix");
                Resolution::Ambiguous(gtins)
            }
        }
    }

    /// Distinct GTINs of every uid starting with `prefix`
    pub fn prefix_gtins(&self, prefix: &str) -> BTreeSet<Gtin> {
        self.prefix_index
            .values_with_prefix(prefix)
            .into_iter()
            .copied()
            .collect()
    }

    pub fn uids_for(&self, gtin: Gtin) -> Option<&IndexSet<String>> {
        self.gtin_to_uids.get(&gtin)
    }

    pub fn gtin_for(&self, uid: &str) -> Option<Gtin> {
        self.uid_to_gtin.get(uid).copied()
    }

    pub fn gtin_count(&self) -> usize {
        self.gtin_to_uids.len()
    }

    pub fn uid_count(&self) -> usize {
        self.uid_to_gtin.len()
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    /// True when the exact map and the prefix tree hold the same pairs
    pub fn is_consistent(&self) -> bool {
        self.uid_to_gtin.len() == self.prefix_index.len()
            && self
                .uid_to_gtin
                .iter()
                .all(|(uid, gtin)| self.prefix_index.get(uid) == Some(gtin))
    }
}

impl Default for IdentityIndex {
    fn default() -> Self {
        Self::empty()
    }
}

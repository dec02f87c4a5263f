//! Build report of an identity index
use chrono::{DateTime, Utc};
use nudger_core::Gtin;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A brand uid claimed by two GTINs. The first claim is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UidConflict {
    pub uid: String,
    pub kept_gtin: Gtin,
    pub rejected_gtin: Gtin,
}

/// What happened while building one index generation, kept for offline audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Unique id of this index generation
    pub build_id: Uuid,
    /// Vertical the sanitizer belongs to
    pub vertical: String,
    pub built_at: DateTime<Utc>,
    pub records_seen: u64,
    /// Records whose GTIN string was present but not numeric
    pub non_numeric_gtins: u64,
    /// Alternate ids rejected by the sanitizer
    pub skipped_alternate_ids: u64,
    /// Empty keys refused by the inversion pass
    pub skipped_empty_keys: u64,
    pub confirmations: u64,
    #[serde(default)]
    pub conflicts: Vec<UidConflict>,
    pub gtin_count: usize,
    pub uid_count: usize,
    /// blake3 over the sorted uid → gtin mapping
    pub fingerprint: String,
    pub elapsed_ms: u64,
}

impl BuildReport {
    pub(crate) fn empty(vertical: impl Into<String>) -> Self {
        Self {
            build_id: Uuid::new_v4(),
            vertical: vertical.into(),
            built_at: Utc::now(),
            records_seen: 0,
            non_numeric_gtins: 0,
            skipped_alternate_ids: 0,
            skipped_empty_keys: 0,
            confirmations: 0,
            conflicts: Vec::new(),
            gtin_count: 0,
            uid_count: 0,
            fingerprint: String::new(),
            elapsed_ms: 0,
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "referentiel {} built: {} records, {} gtins, {} uids, {} conflicts, {} non numeric gtins ({} ms)",
            self.vertical,
            self.records_seen,
            self.gtin_count,
            self.uid_count,
            self.conflicts.len(),
            self.non_numeric_gtins,
            self.elapsed_ms,
        )
    }
}

//! Two-pass referentiel build.
//!
//! Pass 1 (collect) groups every brand uid observed next to a numeric GTIN.
//! It may run over `rayon` chunks; partial results are merged back in input
//! order, so a parallel collect yields exactly what a sequential one does.
//!
//! Pass 2 (invert) walks GTINs in first-seen order and maps each uid to the
//! first GTIN that claimed it. Later claims are logged as conflicts and
//! never overwrite the existing mapping.

use crate::index::IdentityIndex;
use crate::radix::RadixTree;
use crate::report::{BuildReport, UidConflict};
use indexmap::{IndexMap, IndexSet};
use nudger_core::{parse_gtin, Gtin, RawIdentityRecord};
use nudger_registry::ModelSanitizer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Tuning for the collect pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Records per rayon task in `collect_parallel`
    #[serde(default = "default_chunk_size")]
    pub parallel_chunk_size: usize,
}

fn default_chunk_size() -> usize {
    10_000
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            parallel_chunk_size: default_chunk_size(),
        }
    }
}

/// Output of pass 1 over a slice of records
#[derive(Debug, Default)]
struct Collected {
    gtin_to_uids: IndexMap<Gtin, IndexSet<String>>,
    records_seen: u64,
    non_numeric_gtins: u64,
    skipped_alternate_ids: u64,
}

impl Collected {
    fn add_record(&mut self, sanitizer: &ModelSanitizer, record: &RawIdentityRecord) {
        self.records_seen += 1;

        let Some(raw_gtin) = record.gtin.as_deref().filter(|g| !g.is_empty()) else {
            return;
        };
        let Some(gtin) = parse_gtin(raw_gtin) else {
            warn!(gtin = raw_gtin, url = record.url.as_deref().unwrap_or("-"), "non numeric gtin");
            self.non_numeric_gtins += 1;
            return;
        };

        let uids = self.gtin_to_uids.entry(gtin).or_default();
        if let Some(uid) = record.brand_uid() {
            uids.insert(uid.to_string());
        }
        for alternate in &record.alternate_ids {
            match sanitizer.sanitize_model(alternate) {
                Some(uid) => {
                    uids.insert(uid);
                }
                None => {
                    debug!(gtin, alternate = %alternate, "alternate id rejected by sanitizer");
                    self.skipped_alternate_ids += 1;
                }
            }
        }
    }

    fn absorb(&mut self, other: Collected) {
        for (gtin, uids) in other.gtin_to_uids {
            self.gtin_to_uids.entry(gtin).or_default().extend(uids);
        }
        self.records_seen += other.records_seen;
        self.non_numeric_gtins += other.non_numeric_gtins;
        self.skipped_alternate_ids += other.skipped_alternate_ids;
    }
}

/// Mutable build phase of an [`IdentityIndex`]. Consumed by [`build`](Self::build).
#[derive(Debug)]
pub struct ReferentielBuilder {
    sanitizer: ModelSanitizer,
    options: BuildOptions,
    collected: Collected,
    started: Instant,
}

impl ReferentielBuilder {
    pub fn new(sanitizer: ModelSanitizer) -> Self {
        Self {
            sanitizer,
            options: BuildOptions::default(),
            collected: Collected::default(),
            started: Instant::now(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Pass 1, sequential. May be called several times; order is preserved.
    pub fn collect<I>(mut self, records: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<RawIdentityRecord>,
    {
        for record in records {
            self.collected.add_record(&self.sanitizer, record.borrow());
        }
        self
    }

    /// Pass 1 over rayon chunks
    pub fn collect_parallel(mut self, records: &[RawIdentityRecord]) -> Self {
        let chunk_size = self.options.parallel_chunk_size.max(1);
        let sanitizer = &self.sanitizer;

        let partials: Vec<Collected> = records
            .par_chunks(chunk_size)
            .map(|chunk| {
                let mut partial = Collected::default();
                for record in chunk {
                    partial.add_record(sanitizer, record);
                }
                partial
            })
            .collect();

        for partial in partials {
            self.collected.absorb(partial);
        }
        self
    }

    /// Number of GTINs collected so far
    pub fn gtin_count(&self) -> usize {
        self.collected.gtin_to_uids.len()
    }

    /// Pass 2: invert the collected map and freeze the index
    pub fn build(self) -> IdentityIndex {
        let Collected {
            gtin_to_uids,
            records_seen,
            non_numeric_gtins,
            skipped_alternate_ids,
        } = self.collected;

        let mut report = BuildReport::empty(self.sanitizer.vertical());
        report.records_seen = records_seen;
        report.non_numeric_gtins = non_numeric_gtins;
        report.skipped_alternate_ids = skipped_alternate_ids;

        let mut uid_to_gtin: HashMap<String, Gtin> = HashMap::new();
        let mut prefix_index = RadixTree::new();

        for (&gtin, uids) in &gtin_to_uids {
            for uid in uids {
                if uid.is_empty() {
                    warn!(gtin, "refusing empty brand uid in referentiel");
                    report.skipped_empty_keys += 1;
                    continue;
                }

                match uid_to_gtin.get(uid) {
                    None => {
                        uid_to_gtin.insert(uid.clone(), gtin);
                        prefix_index.insert(uid, gtin);
                    }
                    Some(&existing) if existing == gtin => {
                        debug!(gtin, uid = %uid, "match confirmation");
                        report.confirmations += 1;
                    }
                    Some(&existing) => {
                        warn!(uid = %uid, kept = existing, rejected = gtin, "brand uid conflict");
                        report.conflicts.push(UidConflict {
                            uid: uid.clone(),
                            kept_gtin: existing,
                            rejected_gtin: gtin,
                        });
                    }
                }
            }
        }

        report.gtin_count = gtin_to_uids.len();
        report.uid_count = uid_to_gtin.len();
        report.fingerprint = fingerprint(&prefix_index);
        report.elapsed_ms = self.started.elapsed().as_millis() as u64;
        info!(build_id = %report.build_id, "{}", report.summary());

        IdentityIndex::from_parts(gtin_to_uids, uid_to_gtin, prefix_index, report)
    }
}

/// blake3 over the sorted mapping: equal catalogs give equal fingerprints
fn fingerprint(prefix_index: &RadixTree<Gtin>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (uid, gtin) in prefix_index.iter() {
        hasher.update(uid.as_bytes());
        hasher.update(&[0]);
        hasher.update(&gtin.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

//! Grouping of crawled records under their resolved GTIN.

use crate::index::IdentityIndex;
use nudger_core::{Gtin, RawIdentityRecord};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Records grouped by product, plus the ones no GTIN could be found for
#[derive(Debug, Clone, Default)]
pub struct Association {
    pub by_gtin: BTreeMap<Gtin, Vec<RawIdentityRecord>>,
    pub unassociated: Vec<RawIdentityRecord>,
}

impl Association {
    pub fn associated_count(&self) -> usize {
        self.by_gtin.values().map(Vec::len).sum()
    }

    pub fn unassociated_count(&self) -> usize {
        self.unassociated.len()
    }

    pub fn records_for(&self, gtin: Gtin) -> &[RawIdentityRecord] {
        self.by_gtin.get(&gtin).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl IdentityIndex {
    /// Resolve every record and group them by GTIN
    pub fn associate<I>(&self, records: I) -> Association
    where
        I: IntoIterator<Item = RawIdentityRecord>,
    {
        let mut association = Association::default();

        for record in records {
            match self.resolve(&record) {
                Some(gtin) => association.by_gtin.entry(gtin).or_default().push(record),
                None => {
                    warn!(record = %record.describe(), "unassociated record");
                    association.unassociated.push(record);
                }
            }
        }

        info!(
            associated = association.associated_count(),
            unassociated = association.unassociated_count(),
            "end of offers association"
        );
        association
    }
}

//! Outcome of resolving a record against the referentiel.

use nudger_core::Gtin;
use serde::{Deserialize, Serialize};

/// How (and whether) a record was tied to a GTIN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "gtin", rename_all = "snake_case")]
pub enum Resolution {
    /// The record carried its own numeric GTIN
    Direct(Gtin),
    /// Exact brand uid hit
    Exact(Gtin),
    /// A single GTIN among the uids starting with the record's brand uid
    Prefix(Gtin),
    /// Several GTINs share the prefix; never guessed
    Ambiguous(Vec<Gtin>),
    /// Nothing to go on
    Unresolved,
}

impl Resolution {
    pub fn gtin(&self) -> Option<Gtin> {
        match self {
            Resolution::Direct(g) | Resolution::Exact(g) | Resolution::Prefix(g) => Some(*g),
            Resolution::Ambiguous(_) | Resolution::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.gtin().is_some()
    }

    /// Confidence score (0.0 to 1.0)
    pub fn confidence(&self) -> f64 {
        match self {
            Resolution::Direct(_) => 1.0,
            Resolution::Exact(_) => 0.9,
            Resolution::Prefix(_) => 0.6,
            Resolution::Ambiguous(_) | Resolution::Unresolved => 0.0,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Resolution::Direct(_) => "direct",
            Resolution::Exact(_) => "exact",
            Resolution::Prefix(_) => "prefix",
            Resolution::Ambiguous(_) => "ambiguous",
            Resolution::Unresolved => "unresolved",
        }
    }
}

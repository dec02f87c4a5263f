//! Nudger Referentiel: identity resolution for crawled offers
//!
//! Crawled sources rarely agree on a brand/model spelling and often omit the
//! GTIN. The referentiel learns, from a batch of records, which brand uids
//! belong to which GTIN and then resolves new records against it.
//!
//! # Lifecycle
//!
//! ```text
//! records ─▶ ReferentielBuilder ─collect─▶ (gtin → uids) ─build─▶ IdentityIndex (frozen)
//!                                                                    │
//!                                       SharedReferentiel::swap ◀────┘
//! ```
//!
//! # Example
//!
//! ```
//! use nudger_core::RawIdentityRecord;
//! use nudger_referentiel::{IdentityIndex, Resolution};
//! use nudger_registry::ModelSanitizer;
//!
//! let index = IdentityIndex::build(
//!     &[RawIdentityRecord::new()
//!         .with_gtin("3660123456789")
//!         .with_brand_uid("SONY-KV1234")
//!         .with_alternate_id("SONY-KV1234A")],
//!     ModelSanitizer::passthrough(),
//! );
//!
//! let record = RawIdentityRecord::new().with_brand_uid("SONY-KV1234A");
//! assert_eq!(index.resolve(&record), Some(3660123456789));
//!
//! let truncated = RawIdentityRecord::new().with_brand_uid("SONY-KV12");
//! assert_eq!(index.resolve_detailed(&truncated), Resolution::Prefix(3660123456789));
//! ```

pub mod association;
pub mod builder;
pub mod index;
pub mod radix;
pub mod report;
pub mod resolution;
pub mod shared;

pub use association::Association;
pub use builder::{BuildOptions, ReferentielBuilder};
pub use index::IdentityIndex;
pub use radix::RadixTree;
pub use report::{BuildReport, UidConflict};
pub use resolution::Resolution;
pub use shared::SharedReferentiel;

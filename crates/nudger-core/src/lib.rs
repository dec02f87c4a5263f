//! Nudger Core: data model, error model and tracing bootstrap
//!
//! Shared vocabulary between the identity referentiel and the price
//! aggregation crates.

pub mod data_model;
pub mod error;
pub mod telemetry;

pub use data_model::{
    parse_gtin, Condition, Currency, Gtin, OfferDraft, OfferKey, OfferSnapshot,
    PriceHistoryPoint, RawIdentityRecord,
};
pub use error::{NudgerError, NudgerResult, OfferError};
pub use telemetry::init_tracing;

/// Nudger engine version
pub const NUDGER_VERSION: &str = "1.0.0";

//! Nudger Prices: per-product offer aggregation
//!
//! One [`PriceAggregate`] per product holds the live offers, a
//! [`PriceHistorySeries`] per condition and cached trend signs.
//! [`PriceMerger`] is the merge pipeline side: it validates raw offers and
//! runs the periodic price check cycle.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use nudger_core::{Condition, OfferDraft};
//! use nudger_prices::{MergeConfig, PriceAggregate, PriceMerger};
//!
//! let merger = PriceMerger::new(MergeConfig::default());
//! let mut aggregate = PriceAggregate::new();
//!
//! let draft = OfferDraft {
//!     source: Some("shop".into()),
//!     url: Some("https://shop/tv-55".into()),
//!     condition: Some(Condition::New),
//!     price: Some(499.0),
//!     currency: Some("EUR".into()),
//!     ..Default::default()
//! };
//! merger.ingest(&mut aggregate, draft, Utc::now()).unwrap();
//! merger.refresh(&mut aggregate, Utc::now());
//!
//! assert_eq!(aggregate.best_offer(Condition::New).map(|o| o.price()), Some(499.0));
//! ```

pub mod aggregate;
pub mod config;
pub mod history;
pub mod merger;
pub mod trend;

pub use aggregate::PriceAggregate;
pub use config::MergeConfig;
pub use history::PriceHistorySeries;
pub use merger::{MergeOutcome, PriceMerger, RefreshReport};
pub use trend::{PriceTrend, TrendSign};

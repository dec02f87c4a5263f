//! Per-product price aggregate
//!
//! Holds the live offers of one product, the price history of each
//! condition and the cached trend sign per condition.
//!
//! The aggregate does no locking. Mutations of one product must be
//! serialized by the caller; distinct products are independent values.

use crate::history::PriceHistorySeries;
use crate::trend::{PriceTrend, TrendSign};
use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use nudger_core::{Condition, OfferSnapshot, PriceHistoryPoint};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAggregate {
    /// Live offers, structural equality
    #[serde(default)]
    offers: IndexSet<OfferSnapshot>,
    #[serde(default)]
    history: BTreeMap<Condition, PriceHistorySeries>,
    #[serde(default)]
    trend_by_condition: BTreeMap<Condition, TrendSign>,
}

impl PriceAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Offers
    // =========================================================================

    /// Add an offer. A snapshot of the same page at another price is a
    /// distinct member: use [`replace_offer`](Self::replace_offer) to update.
    pub fn merge(&mut self, offer: OfferSnapshot) -> bool {
        self.offers.insert(offer)
    }

    /// Remove every snapshot of `(source, url)`, returning how many were removed
    pub fn remove_offer(&mut self, source: &str, url: &str) -> usize {
        let before = self.offers.len();
        self.offers.retain(|o| !o.is_same_offer(source, url));
        before - self.offers.len()
    }

    /// Remove any prior snapshot of the same page, then insert. Returns true
    /// when a prior snapshot was replaced.
    pub fn replace_offer(&mut self, offer: OfferSnapshot) -> bool {
        let removed = self.remove_offer(offer.source(), offer.url());
        self.offers.insert(offer);
        removed > 0
    }

    pub fn set_offers(&mut self, offers: impl IntoIterator<Item = OfferSnapshot>) {
        self.offers = offers.into_iter().collect();
    }

    pub fn offers(&self) -> impl Iterator<Item = &OfferSnapshot> {
        self.offers.iter()
    }

    pub fn offers_count(&self) -> usize {
        self.offers.len()
    }

    /// Conditions with at least one live offer
    pub fn conditions(&self) -> BTreeSet<Condition> {
        self.offers.iter().map(|o| o.condition()).collect()
    }

    /// Offers of one condition, cheapest first. Equal prices keep insertion order.
    pub fn sorted_offers(&self, condition: Condition) -> Vec<&OfferSnapshot> {
        let mut offers: Vec<&OfferSnapshot> = self
            .offers
            .iter()
            .filter(|o| o.condition() == condition)
            .collect();
        offers.sort_by(|a, b| a.price().total_cmp(&b.price()));
        offers
    }

    pub fn best_offer(&self, condition: Condition) -> Option<&OfferSnapshot> {
        self.sorted_offers(condition).into_iter().next()
    }

    /// Cheapest price across all conditions
    pub fn min_price(&self) -> Option<f64> {
        self.offers
            .iter()
            .map(|o| o.price())
            .min_by(|a, b| a.total_cmp(b))
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn history(&self, condition: Condition) -> Option<&PriceHistorySeries> {
        self.history.get(&condition)
    }

    pub(crate) fn history_mut(&mut self, condition: Condition) -> &mut PriceHistorySeries {
        self.history.entry(condition).or_default()
    }

    /// Append a point to the history of `condition`. Cadence is the caller's
    /// business.
    pub fn append_history_point(&mut self, condition: Condition, point: PriceHistoryPoint) -> bool {
        self.history_mut(condition).append(point)
    }

    pub fn history_lowest(&self, condition: Condition) -> Option<PriceHistoryPoint> {
        self.history(condition).and_then(PriceHistorySeries::lowest)
    }

    pub fn history_highest(&self, condition: Condition) -> Option<PriceHistoryPoint> {
        self.history(condition).and_then(PriceHistorySeries::highest)
    }

    pub fn history_average(&self, condition: Condition) -> Option<f64> {
        self.history(condition).and_then(PriceHistorySeries::average)
    }

    /// True when the best current offer of the snapshot's condition is at
    /// the historical lowest price
    pub fn is_historical_lowest(&self, snapshot: &OfferSnapshot) -> bool {
        let condition = snapshot.condition();
        match (self.history_lowest(condition), self.best_offer(condition)) {
            (Some(lowest), Some(best)) => lowest.price == best.price(),
            _ => false,
        }
    }

    /// Lower of the NEW historical lowest and the cheapest live offer of any
    /// condition. `None` without NEW history.
    pub fn history_price_gap(&self) -> Option<f64> {
        let lowest = self.history_lowest(Condition::New)?.price;
        Some(match self.min_price() {
            Some(min) => min.min(lowest),
            None => lowest,
        })
    }

    /// Drop zero prices and points older than `cutoff` in every series
    pub fn prune_history(&mut self, cutoff: DateTime<Utc>) -> usize {
        self.history.values_mut().map(|s| s.prune(cutoff)).sum()
    }

    // =========================================================================
    // Trends
    // =========================================================================

    /// Cached trend sign, `Stable` until first computed
    pub fn trend(&self, condition: Condition) -> TrendSign {
        self.trend_by_condition
            .get(&condition)
            .copied()
            .unwrap_or_default()
    }

    /// Recompute the cached sign from the history of `condition`
    pub fn refresh_trend(&mut self, condition: Condition) -> TrendSign {
        let sign = self
            .history(condition)
            .map(PriceHistorySeries::trend_sign)
            .unwrap_or_default();
        debug!(%condition, ?sign, "trend refreshed");
        self.trend_by_condition.insert(condition, sign);
        sign
    }

    /// Full trend of the best offer of `condition` against its history
    pub fn price_trend(&self, condition: Condition) -> PriceTrend {
        match self.history(condition) {
            Some(series) => PriceTrend::of(series.points(), self.best_offer(condition)),
            None => PriceTrend::neutral(),
        }
    }
}

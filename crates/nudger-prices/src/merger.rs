//! Merge pipeline helper
//!
//! [`PriceMerger::ingest`] folds one raw offer into an aggregate, replacing
//! the previous snapshot of the same page. [`PriceMerger::refresh`] runs a
//! price check cycle: outdated offers go, one offer per source and condition
//! stays, and the best NEW/OCCASION prices feed the history, which keeps
//! the lowest point of each day.

use crate::aggregate::PriceAggregate;
use crate::config::MergeConfig;
use chrono::{DateTime, Utc};
use indexmap::map::Entry;
use indexmap::IndexMap;
use nudger_core::{Condition, OfferDraft, OfferError, OfferSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// First snapshot of this page
    Inserted,
    /// A previous snapshot of this page was replaced
    Replaced,
    /// Zero priced offer, ignored
    Skipped,
}

/// What a refresh cycle changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub outdated_removed: usize,
    pub duplicates_removed: usize,
    pub history_points_added: usize,
    /// Same-day points folded into the lowest of their day
    pub history_points_compacted: usize,
    pub history_points_pruned: usize,
    pub best_new: Option<f64>,
    pub best_occasion: Option<f64>,
}

impl RefreshReport {
    pub fn summary(&self) -> String {
        format!(
            "{} outdated, {} duplicates removed, {} history points added, {} compacted, {} pruned",
            self.outdated_removed,
            self.duplicates_removed,
            self.history_points_added,
            self.history_points_compacted,
            self.history_points_pruned
        )
    }
}

/// Single writer over one aggregate at a time
#[derive(Debug, Clone, Default)]
pub struct PriceMerger {
    config: MergeConfig,
}

impl PriceMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Validate a raw offer and fold it into `aggregate`
    pub fn ingest(
        &self,
        aggregate: &mut PriceAggregate,
        draft: OfferDraft,
        now: DateTime<Utc>,
    ) -> Result<MergeOutcome, OfferError> {
        if draft.price == Some(0.0) {
            debug!(
                source = draft.source.as_deref().unwrap_or("-"),
                url = draft.url.as_deref().unwrap_or("-"),
                "skipping zero priced offer"
            );
            return Ok(MergeOutcome::Skipped);
        }

        let offer = draft.validate(now)?;
        let outcome = if aggregate.replace_offer(offer) {
            MergeOutcome::Replaced
        } else {
            MergeOutcome::Inserted
        };
        Ok(outcome)
    }

    /// Run one price check cycle at `now`
    pub fn refresh(&self, aggregate: &mut PriceAggregate, now: DateTime<Utc>) -> RefreshReport {
        let mut report = RefreshReport::default();
        let validity = self.config.offer_validity();

        // Cheapest live offer per (source, condition)
        let mut kept: IndexMap<(String, Condition), OfferSnapshot> = IndexMap::new();
        for offer in aggregate.offers() {
            if offer.is_outdated(now, validity) {
                debug!(source = offer.source(), url = offer.url(), "removing outdated offer");
                report.outdated_removed += 1;
                continue;
            }
            match kept.entry((offer.source().to_string(), offer.condition())) {
                Entry::Vacant(slot) => {
                    slot.insert(offer.clone());
                }
                Entry::Occupied(mut slot) => {
                    report.duplicates_removed += 1;
                    if offer.lower_than(slot.get()) {
                        slot.insert(offer.clone());
                    }
                }
            }
        }

        aggregate.set_offers(kept.into_values().map(|offer| {
            let compensation = self.config.estimated_compensation(offer.price());
            offer.with_compensation(compensation)
        }));

        for condition in Condition::TRACKED {
            let best = aggregate.best_offer(condition).map(|o| o.price());
            if let Some(price) = best {
                let series = aggregate.history_mut(condition);
                if series.record_best(price, now) {
                    report.history_points_added += 1;
                }
                // one point per day, the lowest
                report.history_points_compacted += series.compact_daily();
            }
            aggregate.refresh_trend(condition);
            match condition {
                Condition::New => report.best_new = best,
                _ => report.best_occasion = best,
            }
        }

        if let Some(cutoff) = self.config.history_cutoff(now) {
            report.history_points_pruned = aggregate.prune_history(cutoff);
        }

        info!("price refresh: {}", report.summary());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::TrendSign;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 6, 0, 0).unwrap()
    }

    fn draft(source: &str, url: &str, price: f64) -> OfferDraft {
        OfferDraft {
            source: Some(source.to_string()),
            url: Some(url.to_string()),
            condition: Some(Condition::New),
            price: Some(price),
            currency: Some("EUR".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_outcomes() {
        let merger = PriceMerger::default();
        let mut agg = PriceAggregate::new();

        let first = merger.ingest(&mut agg, draft("shop", "https://shop/1", 100.0), now());
        assert_eq!(first, Ok(MergeOutcome::Inserted));
        let again = merger.ingest(&mut agg, draft("shop", "https://shop/1", 90.0), now());
        assert_eq!(again, Ok(MergeOutcome::Replaced));
        let zero = merger.ingest(&mut agg, draft("shop", "https://shop/2", 0.0), now());
        assert_eq!(zero, Ok(MergeOutcome::Skipped));

        assert_eq!(agg.offers_count(), 1);
        assert_eq!(agg.best_offer(Condition::New).unwrap().price(), 90.0);
    }

    #[test]
    fn test_ingest_surfaces_validation_errors() {
        let merger = PriceMerger::default();
        let mut agg = PriceAggregate::new();

        let mut no_currency = draft("shop", "https://shop/1", 10.0);
        no_currency.currency = None;
        let err = merger.ingest(&mut agg, no_currency, now()).unwrap_err();
        assert!(matches!(err, OfferError::MissingCurrency { .. }));
        assert_eq!(agg.offers_count(), 0);
    }

    #[test]
    fn test_refresh_drops_outdated_and_keeps_cheapest_per_source() {
        let merger = PriceMerger::default();
        let mut agg = PriceAggregate::new();

        let stale = OfferDraft {
            captured_at: Some(now() - Duration::days(3)),
            ..draft("old", "https://old/1", 50.0)
        };
        merger.ingest(&mut agg, stale, now()).unwrap();
        merger.ingest(&mut agg, draft("shop", "https://shop/1", 100.0), now()).unwrap();
        merger.ingest(&mut agg, draft("shop", "https://shop/2", 95.0), now()).unwrap();
        merger.ingest(&mut agg, draft("other", "https://other/1", 99.0), now()).unwrap();

        let report = merger.refresh(&mut agg, now());
        assert_eq!(report.outdated_removed, 1);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.best_new, Some(95.0));
        assert_eq!(report.best_occasion, None);
        assert_eq!(report.history_points_added, 1);

        assert_eq!(agg.offers_count(), 2);
        let best = agg.best_offer(Condition::New).unwrap();
        assert_eq!(best.url(), "https://shop/2");
        assert!((best.compensation().unwrap() - 95.0 * 0.05 * 0.75 * 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_refresh_cycles_build_history_and_trend() {
        let merger = PriceMerger::default();
        let mut agg = PriceAggregate::new();

        merger.ingest(&mut agg, draft("shop", "https://shop/1", 100.0), now()).unwrap();
        merger.refresh(&mut agg, now());

        // unchanged price: no new point
        let report = merger.refresh(&mut agg, now() + Duration::hours(1));
        assert_eq!(report.history_points_added, 0);

        let later = now() + Duration::days(1);
        merger.ingest(&mut agg, draft("shop", "https://shop/1", 80.0), later).unwrap();
        merger.refresh(&mut agg, later);

        assert_eq!(agg.history(Condition::New).unwrap().len(), 2);
        assert_eq!(agg.trend(Condition::New), TrendSign::Decreasing);
        let trend = agg.price_trend(Condition::New);
        assert_eq!(trend.variation, Some(-20.0));
        assert_eq!(trend.percent_variation, Some(-20.0));
    }

    #[test]
    fn test_same_day_refreshes_keep_lowest_point() {
        let merger = PriceMerger::default();
        let mut agg = PriceAggregate::new();

        let mut compacted = 0;
        for (hours, price) in [(0, 100.0), (2, 90.0), (4, 95.0), (6, 85.0)] {
            let at = now() + Duration::hours(hours);
            merger.ingest(&mut agg, draft("shop", "https://shop/1", price), at).unwrap();
            compacted += merger.refresh(&mut agg, at).history_points_compacted;
        }

        let history = agg.history(Condition::New).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().price, 85.0);
        assert_eq!(compacted, 3);

        // next day starts a new point
        let tomorrow = now() + Duration::days(1);
        merger.ingest(&mut agg, draft("shop", "https://shop/1", 88.0), tomorrow).unwrap();
        merger.refresh(&mut agg, tomorrow);
        assert_eq!(agg.history(Condition::New).unwrap().len(), 2);
        assert_eq!(agg.trend(Condition::New), TrendSign::Increasing);
    }

    #[test]
    fn test_refresh_prunes_when_retention_configured() {
        let merger = PriceMerger::new(MergeConfig {
            history_retention_days: Some(30),
            ..MergeConfig::default()
        });
        let mut agg = PriceAggregate::new();
        agg.append_history_point(
            Condition::New,
            nudger_core::PriceHistoryPoint::new(now() - Duration::days(90), 120.0),
        );
        merger.ingest(&mut agg, draft("shop", "https://shop/1", 100.0), now()).unwrap();

        let report = merger.refresh(&mut agg, now());
        assert_eq!(report.history_points_pruned, 1);
        assert_eq!(agg.history(Condition::New).unwrap().len(), 1);
    }
}

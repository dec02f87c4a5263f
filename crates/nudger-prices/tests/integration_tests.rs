//! Integration tests for nudger-prices.
//!
//! Offer ranking, history extremes and trends through the public API, then
//! a few price check cycles driven by the merger.

use chrono::{DateTime, Duration, TimeZone, Utc};
use nudger_core::{Condition, Currency, OfferDraft, OfferSnapshot, PriceHistoryPoint};
use nudger_prices::{MergeConfig, MergeOutcome, PriceAggregate, PriceMerger, PriceTrend, TrendSign};

fn t(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, day, 8, 0, 0).unwrap()
}

fn offer(source: &str, price: f64, condition: Condition) -> OfferSnapshot {
    OfferSnapshot::new(
        source,
        format!("https://{}.example/tv", source.to_lowercase()),
        condition,
        price,
        Currency::EUR,
        t(1),
    )
    .unwrap()
}

// =============================================================================
// Offer ranking
// =============================================================================

#[test]
fn test_sorted_offers_per_condition() {
    let mut aggregate = PriceAggregate::new();
    aggregate.merge(offer("A", 100.0, Condition::New));
    aggregate.merge(offer("B", 90.0, Condition::New));
    aggregate.merge(offer("C", 80.0, Condition::Occasion));

    let sorted: Vec<(&str, f64)> = aggregate
        .sorted_offers(Condition::New)
        .into_iter()
        .map(|o| (o.source(), o.price()))
        .collect();
    assert_eq!(sorted, vec![("B", 90.0), ("A", 100.0)]);

    assert_eq!(aggregate.best_offer(Condition::New).unwrap().price(), 90.0);
    assert_eq!(aggregate.best_offer(Condition::Occasion).unwrap().price(), 80.0);
}

#[test]
fn test_sorted_offers_never_leak_other_conditions() {
    let mut aggregate = PriceAggregate::new();
    aggregate.merge(offer("A", 10.0, Condition::Unknown));
    aggregate.merge(offer("B", 20.0, Condition::Occasion));

    assert!(aggregate.sorted_offers(Condition::New).is_empty());
    assert!(aggregate.best_offer(Condition::New).is_none());
    assert_eq!(aggregate.sorted_offers(Condition::Occasion).len(), 1);
}

// =============================================================================
// History extremes
// =============================================================================

#[test]
fn test_history_extremes_on_empty_series() {
    let aggregate = PriceAggregate::new();
    assert!(aggregate.history_lowest(Condition::New).is_none());
    assert!(aggregate.history_highest(Condition::New).is_none());
}

#[test]
fn test_history_extremes_on_single_point() {
    let mut aggregate = PriceAggregate::new();
    let point = PriceHistoryPoint::new(t(1), 100.0);
    aggregate.append_history_point(Condition::New, point);

    assert_eq!(aggregate.history_lowest(Condition::New), Some(point));
    assert_eq!(aggregate.history_highest(Condition::New), Some(point));
    assert_eq!(aggregate.history_average(Condition::New), Some(100.0));
    // other condition untouched
    assert!(aggregate.history_lowest(Condition::Occasion).is_none());
}

// =============================================================================
// Trends
// =============================================================================

#[test]
fn test_trend_against_previous_point() {
    let history = [
        PriceHistoryPoint::new(t(1), 120.0),
        PriceHistoryPoint::new(t(2), 100.0),
        PriceHistoryPoint::new(t(3), 90.0),
    ];
    let current = OfferSnapshot::new("A", "https://a.example/tv", Condition::New, 90.0, Currency::EUR, t(3)).unwrap();

    let trend = PriceTrend::of(&history, Some(&current));
    assert_eq!(trend.variation, Some(-10.0));
    assert_eq!(trend.trend, TrendSign::Decreasing);
    assert_eq!(trend.trend.value(), -1);
    assert_eq!(trend.historical_lowest, Some(90.0));
    assert_eq!(trend.historical_variation, Some(0.0));
    assert_eq!(trend.last_price, Some(100.0));
    assert_eq!(trend.period, Some(Duration::days(1).num_milliseconds()));
}

#[test]
fn test_trend_serializes_without_absent_fields() {
    let json = serde_json::to_value(PriceTrend::neutral()).unwrap();
    assert_eq!(json, serde_json::json!({ "trend": "STABLE" }));
}

// =============================================================================
// Merge pipeline
// =============================================================================

fn draft(source: &str, url: &str, condition: &str, price: f64) -> OfferDraft {
    OfferDraft {
        source: Some(source.to_string()),
        url: Some(url.to_string()),
        condition: Some(condition.parse().unwrap()),
        price: Some(price),
        currency: Some("EUR".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_merge_pipeline_over_several_days() {
    let merger = PriceMerger::new(MergeConfig::from_yaml("history_retention_days: 730").unwrap());
    let mut aggregate = PriceAggregate::new();

    // day 1
    let now = t(1);
    for d in [
        draft("shop", "https://shop/tv", "new", 499.0),
        draft("market", "https://market/tv-1", "used", 350.0),
        draft("market", "https://market/tv-2", "USED", 320.0),
    ] {
        merger.ingest(&mut aggregate, d, now).unwrap();
    }
    let report = merger.refresh(&mut aggregate, now);
    assert_eq!(report.best_new, Some(499.0));
    assert_eq!(report.best_occasion, Some(320.0));
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(aggregate.offers_count(), 2);

    // day 2: price drop on the new offer
    let now = t(2);
    let outcome = merger
        .ingest(&mut aggregate, draft("shop", "https://shop/tv", "new", 449.0), now)
        .unwrap();
    assert_eq!(outcome, MergeOutcome::Replaced);
    merger.refresh(&mut aggregate, now);

    assert_eq!(aggregate.trend(Condition::New), TrendSign::Decreasing);
    assert!(aggregate.is_historical_lowest(aggregate.best_offer(Condition::New).unwrap()));
    // the used offer is still live and cheaper than any new price
    assert_eq!(aggregate.history_price_gap(), Some(320.0));

    // day 5: the used offer was never refreshed and is gone
    let now = t(5);
    merger
        .ingest(&mut aggregate, draft("shop", "https://shop/tv", "new", 479.0), now)
        .unwrap();
    let report = merger.refresh(&mut aggregate, now);
    assert_eq!(report.outdated_removed, 1);
    assert_eq!(report.best_occasion, None);
    assert_eq!(aggregate.conditions().len(), 1);

    assert_eq!(aggregate.trend(Condition::New), TrendSign::Increasing);
    assert_eq!(aggregate.history_price_gap(), Some(449.0));
    assert_eq!(aggregate.history_lowest(Condition::Occasion).unwrap().price, 320.0);
    assert_eq!(aggregate.history(Condition::New).unwrap().len(), 3);
}

#[test]
fn test_invalid_offers_do_not_touch_the_aggregate() {
    let merger = PriceMerger::default();
    let mut aggregate = PriceAggregate::new();

    let mut missing_price = draft("shop", "https://shop/tv", "new", 1.0);
    missing_price.price = None;
    let mut bad_currency = draft("shop", "https://shop/tv", "new", 1.0);
    bad_currency.currency = Some("XYZ".to_string());

    assert!(merger.ingest(&mut aggregate, missing_price, t(1)).is_err());
    let err = merger.ingest(&mut aggregate, bad_currency, t(1)).unwrap_err();
    assert!(err.to_string().starts_with("OFFER/UNKNOWN_CURRENCY"));
    assert_eq!(aggregate.offers_count(), 0);
}

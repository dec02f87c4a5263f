//! Price trends
//!
//! Derived on demand from a history series and the current best offer,
//! never stored.

use nudger_core::{OfferSnapshot, PriceHistoryPoint};
use serde::{Deserialize, Serialize};

/// Direction of a price move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendSign {
    Decreasing,
    #[default]
    Stable,
    Increasing,
}

impl TrendSign {
    pub fn from_variation(variation: f64) -> Self {
        if variation < 0.0 {
            TrendSign::Decreasing
        } else if variation > 0.0 {
            TrendSign::Increasing
        } else {
            TrendSign::Stable
        }
    }

    /// -1, 0 or 1
    pub fn value(&self) -> i8 {
        match self {
            TrendSign::Decreasing => -1,
            TrendSign::Stable => 0,
            TrendSign::Increasing => 1,
        }
    }
}

/// Trend of the current price against the previous history point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTrend {
    pub trend: TrendSign,
    /// Milliseconds between the previous point and the current offer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_variation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_lowest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_variation: Option<f64>,
}

impl PriceTrend {
    /// Stable trend, nothing else known
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Compute the trend of `current` against `history`.
    ///
    /// The history must hold at least two points, the last one being the
    /// current observation; otherwise the trend is neutral.
    pub fn of(history: &[PriceHistoryPoint], current: Option<&OfferSnapshot>) -> Self {
        let Some(current) = current else {
            return Self::neutral();
        };
        if history.len() < 2 {
            return Self::neutral();
        }

        let previous = history[history.len() - 2];
        let variation = current.price() - previous.price;
        let historical_lowest = history
            .iter()
            .map(|p| p.price)
            .min_by(|a, b| a.total_cmp(b));

        Self {
            trend: TrendSign::from_variation(variation),
            period: Some((current.captured_at() - previous.timestamp).num_milliseconds()),
            actual_price: Some(current.price()),
            last_price: Some(previous.price),
            variation: Some(variation),
            percent_variation: (previous.price != 0.0).then(|| variation / previous.price * 100.0),
            historical_lowest,
            historical_variation: historical_lowest.map(|lowest| current.price() - lowest),
        }
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use nudger_core::{Condition, Currency};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap()
    }

    fn offer(price: f64, day: u32) -> OfferSnapshot {
        OfferSnapshot::new("shop", "https://shop/p", Condition::New, price, Currency::EUR, at(day)).unwrap()
    }

    #[test]
    fn test_sign_from_variation() {
        assert_eq!(TrendSign::from_variation(-0.5), TrendSign::Decreasing);
        assert_eq!(TrendSign::from_variation(0.0), TrendSign::Stable);
        assert_eq!(TrendSign::from_variation(3.0).value(), 1);
    }

    #[test]
    fn test_neutral_without_enough_history() {
        let current = offer(90.0, 2);
        assert!(PriceTrend::of(&[], Some(&current)).is_neutral());
        assert!(PriceTrend::of(&[PriceHistoryPoint::new(at(1), 100.0)], Some(&current)).is_neutral());

        let history = [PriceHistoryPoint::new(at(1), 100.0), PriceHistoryPoint::new(at(2), 90.0)];
        assert!(PriceTrend::of(&history, None).is_neutral());
    }

    #[test]
    fn test_increase() {
        let history = [PriceHistoryPoint::new(at(1), 80.0), PriceHistoryPoint::new(at(3), 100.0)];
        let trend = PriceTrend::of(&history, Some(&offer(100.0, 3)));

        assert_eq!(trend.trend, TrendSign::Increasing);
        assert_eq!(trend.variation, Some(20.0));
        assert_eq!(trend.percent_variation, Some(25.0));
        assert_eq!(trend.period, Some(2 * 24 * 3600 * 1000));
        assert_eq!(trend.historical_variation, Some(20.0));
    }

    #[test]
    fn test_percent_variation_absent_on_zero_previous() {
        let history = [PriceHistoryPoint::new(at(1), 0.0), PriceHistoryPoint::new(at(2), 10.0)];
        let trend = PriceTrend::of(&history, Some(&offer(10.0, 2)));
        assert_eq!(trend.variation, Some(10.0));
        assert_eq!(trend.percent_variation, None);
    }
}

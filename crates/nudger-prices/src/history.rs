//! Per-condition price history
//!
//! A chronological series of best observed prices. Points are only ever
//! appended at the end; pruning and daily compaction are explicit
//! maintenance operations driven by the merge pipeline.

use crate::trend::TrendSign;
use chrono::{DateTime, Utc};
use nudger_core::PriceHistoryPoint;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceHistorySeries {
    points: Vec<PriceHistoryPoint>,
}

impl PriceHistorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point. Points older than the last one are refused.
    pub fn append(&mut self, point: PriceHistoryPoint) -> bool {
        if let Some(last) = self.points.last() {
            if point.timestamp < last.timestamp {
                warn!(
                    last = %last.timestamp,
                    refused = %point.timestamp,
                    "refusing history point older than the series tail"
                );
                return false;
            }
        }
        self.points.push(point);
        true
    }

    /// Record the best price of a check cycle. Nothing is appended when the
    /// price did not move since the last point.
    pub fn record_best(&mut self, price: f64, at: DateTime<Utc>) -> bool {
        if self.last().is_some_and(|last| last.price == price) {
            debug!(price, "best price unchanged, no history point");
            return false;
        }
        self.append(PriceHistoryPoint::new(at, price))
    }

    pub fn points(&self) -> &[PriceHistoryPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceHistoryPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest point, the earliest one on ties
    pub fn lowest(&self) -> Option<PriceHistoryPoint> {
        self.points
            .iter()
            .copied()
            .min_by(|a, b| a.price.total_cmp(&b.price))
    }

    /// Highest point, the latest one on ties
    pub fn highest(&self) -> Option<PriceHistoryPoint> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.price.total_cmp(&b.price))
    }

    pub fn average(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: f64 = self.points.iter().map(|p| p.price).sum();
        Some(sum / self.points.len() as f64)
    }

    pub fn last(&self) -> Option<PriceHistoryPoint> {
        self.points.last().copied()
    }

    /// Point right before the last one
    pub fn previous(&self) -> Option<PriceHistoryPoint> {
        self.points.len().checked_sub(2).map(|i| self.points[i])
    }

    /// Direction of the last move
    pub fn trend_sign(&self) -> TrendSign {
        match (self.previous(), self.last()) {
            (Some(previous), Some(last)) => TrendSign::from_variation(last.price - previous.price),
            _ => TrendSign::Stable,
        }
    }

    /// Drop zero prices and points older than `cutoff`. Returns the number
    /// of removed points.
    pub fn prune(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.points.len();
        self.points.retain(|p| p.price != 0.0 && p.timestamp >= cutoff);
        let removed = before - self.points.len();
        if removed > 0 {
            debug!(removed, %cutoff, "pruned price history");
        }
        removed
    }

    /// Keep only the lowest point of each calendar day
    pub fn compact_daily(&mut self) -> usize {
        let before = self.points.len();
        let mut kept: Vec<PriceHistoryPoint> = Vec::with_capacity(before);

        for point in self.points.drain(..) {
            match kept.last_mut() {
                Some(current) if current.day() == point.day() => {
                    if point.price < current.price {
                        *current = point;
                    }
                }
                _ => kept.push(point),
            }
        }

        self.points = kept;
        before - self.points.len()
    }
}

impl FromIterator<PriceHistoryPoint> for PriceHistorySeries {
    fn from_iter<T: IntoIterator<Item = PriceHistoryPoint>>(iter: T) -> Self {
        let mut series = Self::new();
        for point in iter {
            series.append(point);
        }
        series
    }
}

//! Merge pipeline configuration
//!
//! Loaded from YAML; every field has a default so an empty document is a
//! valid configuration.

use chrono::{DateTime, Duration, Utc};
use nudger_core::{NudgerError, NudgerResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Offers older than this are dropped on refresh
    #[serde(default = "default_offer_validity_hours")]
    pub offer_validity_hours: u32,

    /// History older than this is pruned on refresh. `None` keeps everything.
    #[serde(default)]
    pub history_retention_days: Option<u32>,

    // === Compensation estimate ===

    /// Share of the price paid by the affiliation network
    #[serde(default = "default_affiliation_ratio")]
    pub affiliation_ratio: f64,

    /// Share of incomes that turns into benefits
    #[serde(default = "default_incomes_to_benefits_ratio")]
    pub incomes_to_benefits_ratio: f64,

    /// Share of benefits given back to users
    #[serde(default = "default_benefits_reversed_ratio")]
    pub benefits_reversed_ratio: f64,
}

fn default_offer_validity_hours() -> u32 {
    48
}

fn default_affiliation_ratio() -> f64 {
    0.05
}

fn default_incomes_to_benefits_ratio() -> f64 {
    0.75
}

fn default_benefits_reversed_ratio() -> f64 {
    0.1
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            offer_validity_hours: default_offer_validity_hours(),
            history_retention_days: None,
            affiliation_ratio: default_affiliation_ratio(),
            incomes_to_benefits_ratio: default_incomes_to_benefits_ratio(),
            benefits_reversed_ratio: default_benefits_reversed_ratio(),
        }
    }
}

impl MergeConfig {
    /// Load and validate from YAML
    pub fn from_yaml(yaml: &str) -> NudgerResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Ratios must lie in `[0, 1]`
    pub fn validate(&self) -> NudgerResult<()> {
        let ratios = [
            ("affiliation_ratio", self.affiliation_ratio),
            ("incomes_to_benefits_ratio", self.incomes_to_benefits_ratio),
            ("benefits_reversed_ratio", self.benefits_reversed_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(NudgerError::Config(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        Ok(())
    }

    pub fn offer_validity(&self) -> Duration {
        Duration::hours(i64::from(self.offer_validity_hours))
    }

    /// Oldest history timestamp kept at `now`, if retention is configured
    pub fn history_cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.history_retention_days
            .map(|days| now - Duration::days(i64::from(days)))
    }

    /// Estimated amount given back to the user for an offer at `price`
    pub fn estimated_compensation(&self, price: f64) -> f64 {
        price * self.affiliation_ratio * self.incomes_to_benefits_ratio * self.benefits_reversed_ratio
    }
}

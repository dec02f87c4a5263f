//! Data Model: RawIdentityRecord, OfferSnapshot, PriceHistoryPoint
use crate::error::OfferError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use tracing::debug;

/// Global Trade Item Number, the canonical product id.
pub type Gtin = u64;

/// Parse a raw GTIN string. Only non-empty, all-digit strings that fit in a
/// `u64` are accepted. GTINs have at most 14 digits; a digit run above
/// `u64::MAX` is treated as no GTIN.
pub fn parse_gtin(raw: &str) -> Option<Gtin> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Identity attributes of a crawled record, as produced by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIdentityRecord {
    /// Raw GTIN string (may be absent or not numeric)
    #[serde(default)]
    pub gtin: Option<String>,
    /// Brand-model identifier (ex: "SONY-KV1234")
    #[serde(default, alias = "brandUid")]
    pub brand_uid: Option<String>,
    /// Brand name as crawled
    #[serde(default)]
    pub brand: Option<String>,
    /// Alternate identifiers seen for the same product
    #[serde(default, alias = "alternateIds")]
    pub alternate_ids: BTreeSet<String>,
    /// Page the record was crawled from
    #[serde(default)]
    pub url: Option<String>,
}

impl RawIdentityRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gtin(mut self, gtin: impl Into<String>) -> Self {
        self.gtin = Some(gtin.into());
        self
    }

    pub fn with_brand_uid(mut self, uid: impl Into<String>) -> Self {
        self.brand_uid = Some(uid.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_alternate_id(mut self, id: impl Into<String>) -> Self {
        self.alternate_ids.insert(id.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// The GTIN if present and numeric
    pub fn numeric_gtin(&self) -> Option<Gtin> {
        self.gtin.as_deref().and_then(parse_gtin)
    }

    /// The brand uid, trimmed, if not blank
    pub fn brand_uid(&self) -> Option<&str> {
        self.brand_uid
            .as_deref()
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
    }

    /// Short description for log lines
    pub fn describe(&self) -> String {
        format!(
            "gtin={} uid={} url={}",
            self.gtin.as_deref().unwrap_or("-"),
            self.brand_uid.as_deref().unwrap_or("-"),
            self.url.as_deref().unwrap_or("-"),
        )
    }
}

/// Commercial state of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    New,
    #[serde(alias = "USED")]
    Occasion,
    Unknown,
}

impl Condition {
    /// Conditions that carry a price history
    pub const TRACKED: [Condition; 2] = [Condition::New, Condition::Occasion];

    pub fn is_tracked(&self) -> bool {
        matches!(self, Condition::New | Condition::Occasion)
    }
}

impl FromStr for Condition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().as_str() {
            "NEW" => Condition::New,
            "OCCASION" | "USED" | "REFURBISHED" => Condition::Occasion,
            _ => Condition::Unknown,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Condition::New => write!(f, "NEW"),
            Condition::Occasion => write!(f, "OCCASION"),
            Condition::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    EUR,
    USD,
    GBP,
    CHF,
}

impl FromStr for Currency {
    type Err = OfferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EUR" | "€" => Ok(Currency::EUR),
            "USD" | "$" => Ok(Currency::USD),
            "GBP" | "£" => Ok(Currency::GBP),
            "CHF" => Ok(Currency::CHF),
            _ => Err(OfferError::UnknownCurrency { code: s.to_string() }),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Raw offer as handed over by ingestion, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferDraft {
    pub source: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub compensation: Option<f64>,
    #[serde(default)]
    pub affiliation_token: Option<String>,
}

impl OfferDraft {
    /// Validate into an immutable snapshot. A draft without capture time is
    /// stamped with `now`; a draft without condition is `Unknown`.
    pub fn validate(self, now: DateTime<Utc>) -> Result<OfferSnapshot, OfferError> {
        self.into_snapshot(now).map_err(|e| {
            debug!(error = %e, "offer rejected");
            e
        })
    }

    fn into_snapshot(self, now: DateTime<Utc>) -> Result<OfferSnapshot, OfferError> {
        let url = self.url.filter(|u| !u.trim().is_empty());
        let source = match self.source.filter(|s| !s.trim().is_empty()) {
            Some(source) => source,
            None => {
                return Err(OfferError::MissingSource {
                    url: url.unwrap_or_default(),
                })
            }
        };
        let url = url.ok_or_else(|| OfferError::MissingUrl {
            source_name: source.clone(),
        })?;
        let price = self.price.ok_or_else(|| OfferError::MissingPrice {
            source_name: source.clone(),
            url: url.clone(),
        })?;
        if !price.is_finite() || price <= 0.0 {
            return Err(OfferError::InvalidPrice {
                source_name: source,
                url,
                price,
            });
        }
        let currency = match self.currency {
            Some(code) => code.parse::<Currency>()?,
            None => {
                return Err(OfferError::MissingCurrency {
                    source_name: source,
                    url,
                })
            }
        };

        Ok(OfferSnapshot {
            label: self.label.unwrap_or_default(),
            condition: self.condition.unwrap_or(Condition::Unknown),
            captured_at: self.captured_at.unwrap_or(now),
            compensation: self.compensation,
            affiliation_token: self.affiliation_token,
            source,
            url,
            price,
            currency,
        })
    }
}

/// Deduplication key of an offer: one live offer per source page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OfferKey {
    pub source: String,
    pub url: String,
}

/// One priced offer at one point in time.
///
/// Equality and hashing are structural (price and capture time included), so
/// two snapshots of the same page at different prices are distinct set
/// members. Use [`OfferSnapshot::key`] to match a refreshed offer against the
/// one it replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferSnapshot {
    source: String,
    label: String,
    url: String,
    condition: Condition,
    price: f64,
    currency: Currency,
    captured_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compensation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    affiliation_token: Option<String>,
}

impl OfferSnapshot {
    pub fn new(
        source: impl Into<String>,
        url: impl Into<String>,
        condition: Condition,
        price: f64,
        currency: Currency,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, OfferError> {
        OfferDraft {
            source: Some(source.into()),
            url: Some(url.into()),
            condition: Some(condition),
            price: Some(price),
            currency: Some(currency.to_string()),
            captured_at: Some(captured_at),
            ..Default::default()
        }
        .validate(captured_at)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_compensation(mut self, compensation: f64) -> Self {
        self.compensation = Some(compensation);
        self
    }

    pub fn with_affiliation_token(mut self, token: impl Into<String>) -> Self {
        self.affiliation_token = Some(token.into());
        self
    }

    pub fn key(&self) -> OfferKey {
        OfferKey {
            source: self.source.clone(),
            url: self.url.clone(),
        }
    }

    pub fn is_same_offer(&self, source: &str, url: &str) -> bool {
        self.source == source && self.url == url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn compensation(&self) -> Option<f64> {
        self.compensation
    }

    pub fn affiliation_token(&self) -> Option<&str> {
        self.affiliation_token.as_deref()
    }

    /// True when the snapshot is older than `validity` at `now`
    pub fn is_outdated(&self, now: DateTime<Utc>, validity: Duration) -> bool {
        now - self.captured_at > validity
    }

    pub fn lower_than(&self, other: &OfferSnapshot) -> bool {
        self.price < other.price
    }
}

impl PartialEq for OfferSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.url == other.url
            && self.label == other.label
            && self.condition == other.condition
            && self.price.to_bits() == other.price.to_bits()
            && self.currency == other.currency
            && self.captured_at == other.captured_at
            && self.compensation.map(f64::to_bits) == other.compensation.map(f64::to_bits)
            && self.affiliation_token == other.affiliation_token
    }
}

impl Eq for OfferSnapshot {}

impl Hash for OfferSnapshot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.url.hash(state);
        self.label.hash(state);
        self.condition.hash(state);
        self.price.to_bits().hash(state);
        self.currency.hash(state);
        self.captured_at.hash(state);
        self.compensation.map(f64::to_bits).hash(state);
        self.affiliation_token.hash(state);
    }
}

/// One observed best price for a condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl PriceHistoryPoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }

    /// Calendar day (UTC) of the observation
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

impl From<&OfferSnapshot> for PriceHistoryPoint {
    fn from(offer: &OfferSnapshot) -> Self {
        Self::new(offer.captured_at(), offer.price())
    }
}

//! Model sanitization for brand-model identifiers.
//!
//! Turns crawled model strings into canonical brand uids:
//! - ordered parsers from the vertical profile
//! - optional extraction pattern (exactly one distinct match required)
//! - brand prefix removal for the record's own uid

use crate::profile::{ModelParser, VerticalProfile};
use lazy_static::lazy_static;
use nudger_core::{NudgerError, NudgerResult, RawIdentityRecord};
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

lazy_static! {
    /// Multiple whitespace pattern
    static ref MULTI_SPACE: Regex = Regex::new(r"\s+").unwrap();

    /// Separators dropped by `strip_separators`
    static ref SEPARATORS: Regex = Regex::new(r"[\s\-_./]+").unwrap();
}

/// Compiled sanitization rules of one vertical
#[derive(Debug, Clone)]
pub struct ModelSanitizer {
    vertical: String,
    parsers: Vec<ModelParser>,
    token_removals: Vec<String>,
    pattern: Option<Regex>,
}

impl ModelSanitizer {
    /// Compile a profile. Fails when the extraction pattern is not a valid regex.
    pub fn from_profile(profile: &VerticalProfile) -> NudgerResult<Self> {
        let pattern = match &profile.brand_uid_pattern {
            Some(p) => Some(Regex::new(p).map_err(|e| {
                NudgerError::Registry(format!("invalid brand uid pattern for {}: {}", profile.id, e))
            })?),
            None => None,
        };

        Ok(Self {
            vertical: profile.id.clone(),
            parsers: profile.parsers.clone(),
            token_removals: profile
                .model_token_removals
                .iter()
                .filter(|t| !t.is_empty())
                .cloned()
                .collect(),
            pattern,
        })
    }

    /// Sanitizer that only trims
    pub fn passthrough() -> Self {
        Self {
            vertical: "generic".to_string(),
            parsers: vec![ModelParser::Trim],
            token_removals: Vec::new(),
            pattern: None,
        }
    }

    pub fn vertical(&self) -> &str {
        &self.vertical
    }

    /// Run the configured parsers in order
    pub fn apply_parsers(&self, raw: &str) -> String {
        let mut value = raw.to_string();
        for parser in &self.parsers {
            value = match parser {
                ModelParser::Trim => value.trim().to_string(),
                ModelParser::Uppercase => value.to_uppercase(),
                ModelParser::CollapseWhitespace => MULTI_SPACE.replace_all(&value, " ").into_owned(),
                ModelParser::RemoveTokens => {
                    for token in &self.token_removals {
                        value = value.replace(token.as_str(), "");
                    }
                    value
                }
                ModelParser::StripSeparators => SEPARATORS.replace_all(&value, "").into_owned(),
            };
        }
        value
    }

    /// Sanitize a model string into a brand uid, `None` when it cannot be
    /// validated.
    pub fn sanitize_model(&self, raw: &str) -> Option<String> {
        let value = self.apply_parsers(raw);
        if value.trim().is_empty() {
            debug!(vertical = %self.vertical, raw, "model empty after parsers");
            return None;
        }

        let Some(pattern) = &self.pattern else {
            return Some(value);
        };

        let extracted: BTreeSet<&str> = pattern.find_iter(&value).map(|m| m.as_str()).collect();
        if extracted.len() != 1 {
            info!(
                vertical = %self.vertical,
                model = %value,
                matches = extracted.len(),
                "could not validate model through extraction pattern"
            );
            return None;
        }

        let uid = extracted.into_iter().next()?.to_string();
        if uid != value {
            warn!(vertical = %self.vertical, extracted = %uid, model = %value, "extracted brand uid mismatch");
        }
        Some(uid)
    }

    /// Standardise the record's own brand uid in place.
    ///
    /// Returns `false` when the record carries a brand uid that does not
    /// survive sanitization and should be dropped. When sanitization changes
    /// the value, the previous spelling is kept as an alternate id.
    pub fn standardize(&self, record: &mut RawIdentityRecord) -> bool {
        let Some(raw) = record.brand_uid.as_deref() else {
            return true;
        };

        let mut value = MULTI_SPACE
            .replace_all(&raw.to_uppercase(), " ")
            .trim()
            .to_string();
        if value.is_empty() {
            info!(record = %record.describe(), "dropping record, brand uid empty after trimming");
            return false;
        }

        if let Some(brand) = record.brand.as_deref().map(|b| b.trim().to_uppercase()) {
            if !brand.is_empty() && value.starts_with(&brand) {
                debug!(brand = %brand, uid = %value, "removing brand from brand uid");
                value = value[brand.len()..]
                    .trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '_')
                    .to_string();
            }
        }

        match self.sanitize_model(&value) {
            Some(sanitized) => {
                if sanitized != value {
                    record.alternate_ids.insert(value);
                }
                record.brand_uid = Some(sanitized);
                true
            }
            None => {
                debug!(record = %record.describe(), "empty brand uid after sanitization");
                false
            }
        }
    }
}

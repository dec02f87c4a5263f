//! Vertical profiles
//!
//! Defines how brand-model identifiers are cleaned up for one vertical.

use nudger_core::NudgerResult;
use serde::{Deserialize, Serialize};

/// Known model parsers, applied in the order listed by a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelParser {
    /// Trim surrounding whitespace
    Trim,
    /// Uppercase the whole value
    Uppercase,
    /// Collapse whitespace runs into a single space
    CollapseWhitespace,
    /// Remove every `model_token_removals` entry
    RemoveTokens,
    /// Drop spaces, dashes, underscores, dots and slashes
    StripSeparators,
}

/// Sanitization profile for one vertical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerticalProfile {
    /// Vertical id (ex: "tv")
    pub id: String,

    /// Tokens removed from models by the `remove_tokens` parser
    #[serde(default)]
    pub model_token_removals: Vec<String>,

    /// Regex extracting the canonical brand uid out of a cleaned model
    #[serde(default)]
    pub brand_uid_pattern: Option<String>,

    /// Parsers applied before extraction
    #[serde(default = "default_parsers")]
    pub parsers: Vec<ModelParser>,
}

fn default_parsers() -> Vec<ModelParser> {
    vec![ModelParser::RemoveTokens, ModelParser::Trim]
}

impl VerticalProfile {
    /// Profile with no removals and no extraction pattern
    pub fn generic(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_token_removals: Vec::new(),
            brand_uid_pattern: None,
            parsers: default_parsers(),
        }
    }

    pub fn with_token_removals(mut self, tokens: &[&str]) -> Self {
        self.model_token_removals = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.brand_uid_pattern = Some(pattern.into());
        self
    }

    pub fn with_parsers(mut self, parsers: Vec<ModelParser>) -> Self {
        self.parsers = parsers;
        self
    }

    /// Load profile from YAML
    pub fn from_yaml(yaml: &str) -> NudgerResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_profile() {
        let profile = VerticalProfile::generic("tv");
        assert_eq!(profile.id, "tv");
        assert!(profile.brand_uid_pattern.is_none());
        assert_eq!(profile.parsers, vec![ModelParser::RemoveTokens, ModelParser::Trim]);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
id: tv
model_token_removals: ["(2023)", "FULL HD"]
brand_uid_pattern: "[A-Z0-9]{2,}[A-Z0-9-]*"
parsers: [uppercase, remove_tokens, collapse_whitespace, trim]
"#;
        let profile = VerticalProfile::from_yaml(yaml).unwrap();
        assert_eq!(profile.model_token_removals.len(), 2);
        assert_eq!(profile.parsers[0], ModelParser::Uppercase);
        assert_eq!(profile.parsers.len(), 4);
    }

    #[test]
    fn test_from_yaml_defaults_parsers() {
        let profile = VerticalProfile::from_yaml("id: washing-machine").unwrap();
        assert_eq!(profile.parsers, default_parsers());
    }

    #[test]
    fn test_unknown_parser_is_rejected() {
        let yaml = "id: tv\nparsers: [reflect_class]";
        assert!(VerticalProfile::from_yaml(yaml).is_err());
    }
}

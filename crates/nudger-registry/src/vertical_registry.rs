//! Vertical Registry
use crate::profile::VerticalProfile;
use crate::sanitizer::ModelSanitizer;
use nudger_core::{NudgerError, NudgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Profiles known to the referentiel, keyed by vertical id.
///
/// Built once by the owning service and passed by value to whoever needs a
/// sanitizer; tests build their own registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerticalRegistry {
    profiles: BTreeMap<String, VerticalProfile>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    verticals: Vec<VerticalProfile>,
}

impl VerticalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a `verticals:` list from YAML. Later duplicates replace earlier ones.
    pub fn from_yaml(yaml: &str) -> NudgerResult<Self> {
        let file: RegistryFile = serde_yaml::from_str(yaml)?;
        let mut registry = Self::new();
        for profile in file.verticals {
            registry.register(profile);
        }
        Ok(registry)
    }

    /// Register a profile, returning the one it replaced
    pub fn register(&mut self, profile: VerticalProfile) -> Option<VerticalProfile> {
        self.profiles.insert(profile.id.clone(), profile)
    }

    pub fn get(&self, id: &str) -> Option<&VerticalProfile> {
        self.profiles.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Compile the sanitizer of a vertical
    pub fn sanitizer_for(&self, id: &str) -> NudgerResult<ModelSanitizer> {
        let profile = self
            .get(id)
            .ok_or_else(|| NudgerError::Registry(format!("unknown vertical '{}'", id)))?;
        ModelSanitizer::from_profile(profile)
    }
}

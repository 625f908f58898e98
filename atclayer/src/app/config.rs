//! Application configuration.
//!
//! `AppConfig` is the single configuration surface passed to
//! [`crate::app::App::start`]: where the file index lives and which
//! empty-position defaulting rule each domain follows.

use std::collections::BTreeMap;

use crate::registry::EmptyPositionPolicy;

/// Default location of the file index, relative to the source root.
pub const DEFAULT_INDEX_PATH: &str = "file-index.json";

/// The terminal-area domain name.
pub const TERMINAL_DOMAIN: &str = "tracon";

/// The en-route domain name.
pub const ENROUTE_DOMAIN: &str = "enroute";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the file index, resolved through the collection source.
    pub index_path: String,

    /// Per-domain empty-position defaulting rules.
    pub policies: BTreeMap<String, EmptyPositionPolicy>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // The two stock domains disagree on the defaulting rule: terminal
        // airspace activates all positions, en-route deactivates.
        let mut policies = BTreeMap::new();
        policies.insert(TERMINAL_DOMAIN.to_string(), EmptyPositionPolicy::ActivateAll);
        policies.insert(ENROUTE_DOMAIN.to_string(), EmptyPositionPolicy::Deactivate);
        Self {
            index_path: DEFAULT_INDEX_PATH.to_string(),
            policies,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file index path.
    pub fn with_index_path(mut self, path: impl Into<String>) -> Self {
        self.index_path = path.into();
        self
    }

    /// Set or override the defaulting rule for one domain.
    pub fn with_domain_policy(mut self, domain: &str, policy: EmptyPositionPolicy) -> Self {
        self.policies.insert(domain.to_string(), policy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let config = AppConfig::default();
        assert_eq!(config.index_path, DEFAULT_INDEX_PATH);
        assert_eq!(
            config.policies[TERMINAL_DOMAIN],
            EmptyPositionPolicy::ActivateAll
        );
        assert_eq!(
            config.policies[ENROUTE_DOMAIN],
            EmptyPositionPolicy::Deactivate
        );
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::new()
            .with_index_path("data/index.json")
            .with_domain_policy("oceanic", EmptyPositionPolicy::Deactivate)
            .with_domain_policy(TERMINAL_DOMAIN, EmptyPositionPolicy::Deactivate);
        assert_eq!(config.index_path, "data/index.json");
        assert_eq!(config.policies["oceanic"], EmptyPositionPolicy::Deactivate);
        assert_eq!(
            config.policies[TERMINAL_DOMAIN],
            EmptyPositionPolicy::Deactivate
        );
    }
}

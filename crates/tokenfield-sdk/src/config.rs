//! Session configuration.

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};
use tokenfield_codec::{DecoderConfig, ResolveMode};

/// Configuration for an editing session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How marker lookups are scheduled while loading.
    pub resolve_mode: ResolveMode,
    /// Capacity of the session and editor event channels.
    pub event_capacity: usize,
    /// Memoize resolver lookups for the lifetime of the session.
    pub cache_lookups: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolve_mode: ResolveMode::default(),
            event_capacity: 100,
            cache_lookups: false,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(SdkError::Config("event_capacity must be positive".into()));
        }
        if let ResolveMode::Concurrent { limit: 0 } = self.resolve_mode {
            return Err(SdkError::Config("concurrency limit must be positive".into()));
        }
        Ok(())
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            mode: self.resolve_mode,
        }
    }
}

/// Builder for session configuration.
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    pub fn resolve_mode(mut self, mode: ResolveMode) -> Self {
        self.config.resolve_mode = mode;
        self
    }

    /// Resolve markers one at a time.
    pub fn sequential(self) -> Self {
        self.resolve_mode(ResolveMode::Sequential)
    }

    /// Resolve up to `limit` markers at once.
    pub fn concurrency_limit(self, limit: usize) -> Self {
        self.resolve_mode(ResolveMode::Concurrent { limit })
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn cache_lookups(mut self, enabled: bool) -> Self {
        self.config.cache_lookups = enabled;
        self
    }

    pub fn build(self) -> SessionConfig {
        self.config
    }
}

impl Default for SessionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = SessionConfigBuilder::new()
            .concurrency_limit(4)
            .event_capacity(8)
            .cache_lookups(true)
            .build();

        assert_eq!(config.resolve_mode, ResolveMode::Concurrent { limit: 4 });
        assert_eq!(config.event_capacity, 8);
        assert!(config.cache_lookups);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{"cache_lookups": true}"#).unwrap();
        assert_eq!(config.resolve_mode, ResolveMode::default());
        assert_eq!(config.event_capacity, 100);
        assert!(config.cache_lookups);

        let sequential =
            SessionConfig::from_json(r#"{"resolve_mode": {"mode": "sequential"}}"#).unwrap();
        assert_eq!(sequential.decoder_config().mode, ResolveMode::Sequential);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_capacity = SessionConfigBuilder::new().event_capacity(0).build();
        assert!(matches!(zero_capacity.validate(), Err(SdkError::Config(_))));

        let zero_limit = SessionConfigBuilder::new().concurrency_limit(0).build();
        assert!(matches!(zero_limit.validate(), Err(SdkError::Config(_))));

        assert!(matches!(
            SessionConfig::from_json("[1, 2]"),
            Err(SdkError::Config(_))
        ));
    }
}

//! Discovery configuration
//!
//! Defines the tunables of the discovery pipeline: concurrency caps, the
//! alias pacing delay and the transport retry policy.

use std::time::Duration;

use crate::error::FetchError;
use crate::retry::RetryPolicy;

/// Tag enrichment runs one account at a time
pub const DEFAULT_TAG_CONCURRENCY: usize = 1;

/// At most this many alias lookups are in flight
pub const DEFAULT_ALIAS_CONCURRENCY: usize = 10;

/// Delay each alias worker waits before its call, to stay under rate limits
pub const DEFAULT_ALIAS_PACING: Duration = Duration::from_secs(1);

/// Environment variable overriding [`RetryPolicy::max_retries`]
pub const MAX_RETRIES_ENV: &str = "AWS_ALIASED_PROFILES_MAX_RETRIES";

/// Environment variable overriding the alias concurrency cap
pub const ALIAS_CONCURRENCY_ENV: &str = "AWS_ALIASED_PROFILES_ALIAS_CONCURRENCY";

/// Environment variable overriding the alias pacing delay, in milliseconds
pub const ALIAS_PACING_ENV: &str = "AWS_ALIASED_PROFILES_ALIAS_PACING_MS";

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum concurrent tag workers
    pub tag_concurrency: usize,

    /// Maximum concurrent alias workers
    pub alias_concurrency: usize,

    /// Sleep before each alias call
    pub alias_pacing: Duration,

    /// Backoff applied to transport failures
    pub retry: RetryPolicy,
}

impl FetchConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            tag_concurrency: DEFAULT_TAG_CONCURRENCY,
            alias_concurrency: DEFAULT_ALIAS_CONCURRENCY,
            alias_pacing: DEFAULT_ALIAS_PACING,
            retry: RetryPolicy::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Optional environment variables:
    /// - AWS_ALIASED_PROFILES_MAX_RETRIES (default: 3)
    /// - AWS_ALIASED_PROFILES_ALIAS_CONCURRENCY (default: 10)
    /// - AWS_ALIASED_PROFILES_ALIAS_PACING_MS (default: 1000)
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new();

        let max_retries = lookup(MAX_RETRIES_ENV)
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.retry.max_retries);

        let alias_concurrency = lookup(ALIAS_CONCURRENCY_ENV)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.alias_concurrency);

        let alias_pacing = lookup(ALIAS_PACING_ENV)
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.alias_pacing);

        Self {
            alias_concurrency,
            alias_pacing,
            retry: RetryPolicy {
                max_retries,
                ..defaults.retry
            },
            ..defaults
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.tag_concurrency == 0 {
            return Err(FetchError::Config("tag concurrency must be at least 1".into()));
        }

        if self.alias_concurrency == 0 {
            return Err(FetchError::Config("alias concurrency must be at least 1".into()));
        }

        if self.retry.initial_delay > self.retry.max_delay {
            return Err(FetchError::Config(
                "initial retry delay cannot exceed the maximum delay".into(),
            ));
        }

        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.tag_concurrency, 1);
        assert_eq!(config.alias_concurrency, 10);
        assert_eq!(config.alias_pacing, Duration::from_secs(1));
        assert_eq!(config.retry.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = FetchConfig::default();

        config.alias_concurrency = 0;
        assert!(config.validate().is_err());

        config.alias_concurrency = 10;
        config.tag_concurrency = 0;
        assert!(config.validate().is_err());

        config.tag_concurrency = 1;
        config.retry.initial_delay = Duration::from_secs(60);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_overlay() {
        let env: HashMap<&str, &str> = HashMap::from([
            (MAX_RETRIES_ENV, "0"),
            (ALIAS_CONCURRENCY_ENV, "4"),
            (ALIAS_PACING_ENV, "250"),
        ]);
        let config = FetchConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.alias_concurrency, 4);
        assert_eq!(config.alias_pacing, Duration::from_millis(250));
        assert_eq!(config.tag_concurrency, 1);
    }

    #[test]
    fn test_unparseable_values_use_defaults() {
        let config = FetchConfig::from_lookup(|key| {
            (key == ALIAS_CONCURRENCY_ENV).then(|| "lots".to_string())
        });
        assert_eq!(config.alias_concurrency, DEFAULT_ALIAS_CONCURRENCY);
    }
}

//! Configuration management for Turnstile.

use serde::{Deserialize, Serialize};

/// Main configuration for the Turnstile limiter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnstileConfig {
    /// Slot store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Admission policy configuration
    #[serde(default)]
    pub limiter: LimiterPolicy,
}

/// Slot store connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store connection URL
    #[serde(default = "default_store_url")]
    pub url: String,

    /// Key prefix namespacing this limiter's slot pool
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Maximum connections in the store pool
    #[serde(default)]
    pub pool_max_size: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            key_prefix: default_key_prefix(),
            pool_max_size: None,
        }
    }
}

fn default_store_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "turnstile:slots:".to_string()
}

/// Admission policy applied when the caller supplies no window of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterPolicy {
    /// Operations allowed per window
    #[serde(default = "default_limit_ops")]
    pub limit_ops: u32,

    /// Window length in seconds
    #[serde(default = "default_limit_period_secs")]
    pub limit_period_secs: u64,

    /// Whether callers wait for a free slot
    #[serde(default = "default_wait")]
    pub wait: bool,
}

impl Default for LimiterPolicy {
    fn default() -> Self {
        Self {
            limit_ops: default_limit_ops(),
            limit_period_secs: default_limit_period_secs(),
            wait: default_wait(),
        }
    }
}

fn default_limit_ops() -> u32 {
    7
}

fn default_limit_period_secs() -> u64 {
    60
}

fn default_wait() -> bool {
    true
}

impl TurnstileConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(contents: &str) -> crate::error::Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| crate::error::TurnstileError::Config(e.to_string()))
    }

    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TurnstileConfig::default();

        assert_eq!(config.store.url, "redis://127.0.0.1:6379");
        assert_eq!(config.store.key_prefix, "turnstile:slots:");
        assert_eq!(config.store.pool_max_size, None);
        assert_eq!(config.limiter.limit_ops, 7);
        assert_eq!(config.limiter.limit_period_secs, 60);
        assert!(config.limiter.wait);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
store:
  url: redis://cache.internal:6380
limiter:
  limit_ops: 32
"#;
        let config = TurnstileConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.store.url, "redis://cache.internal:6380");
        assert_eq!(config.store.key_prefix, "turnstile:slots:");
        assert_eq!(config.limiter.limit_ops, 32);
        assert_eq!(config.limiter.limit_period_secs, 60);
    }

    #[test]
    fn test_invalid_yaml_is_a_config_error() {
        let result = TurnstileConfig::from_yaml("store: [not, a, mapping]");
        assert!(matches!(
            result,
            Err(crate::error::TurnstileError::Config(_))
        ));
    }
}

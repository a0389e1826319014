//! Configuration schema definitions.
//!
//! [`Config`] is the file-facing shape: every field optional, unknown
//! fields rejected. [`ResolvedConfig`] is what the engine consumes
//! after defaults, file, environment, and programmatic overrides have
//! been folded together by the builder.

use serde::{Deserialize, Serialize};

/// Raw configuration as read from a file or assembled by overrides.
///
/// # Examples
///
/// ```
/// use innkeep::config::Config;
///
/// let config = Config {
///     hold_ttl_minutes: Some(45),
///     default_currency: Some("EUR".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(config.hold_ttl_minutes, Some(45));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Minutes a hold stays active before it is due for expiry.
    pub hold_ttl_minutes: Option<i64>,

    /// Currency assumed when a request does not carry one.
    pub default_currency: Option<String>,

    /// Maximum time to wait for the database writer slot (seconds).
    pub maximum_lock_wait_seconds: Option<u64>,

    /// Output format for list commands.
    pub output_format: Option<OutputFormat>,

    /// Retention settings.
    pub retention: Option<RetentionConfig>,
}

/// Retention configuration.
///
/// # Examples
///
/// ```
/// use innkeep::config::RetentionConfig;
///
/// let retention = RetentionConfig { outbox_days: Some(30) };
/// assert_eq!(retention.outbox_days, Some(30));
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RetentionConfig {
    /// Days outbox events are kept before the sweep removes them.
    pub outbox_days: Option<u32>,
}

/// Output format for list commands.
///
/// # Examples
///
/// ```
/// use innkeep::config::OutputFormat;
///
/// assert_eq!(OutputFormat::Json.to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output format.
    Json,
    /// Human-readable table format.
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Table => write!(f, "table"),
        }
    }
}

/// Fully resolved configuration with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Minutes a hold stays active before it is due for expiry.
    pub hold_ttl_minutes: i64,
    /// Currency assumed when a request does not carry one.
    pub default_currency: String,
    /// Maximum time to wait for the database writer slot (seconds).
    pub maximum_lock_wait_seconds: u64,
    /// Output format for list commands.
    pub output_format: OutputFormat,
    /// Days outbox events are kept before the sweep removes them.
    pub outbox_retention_days: u32,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            hold_ttl_minutes: 30,
            default_currency: "EUR".to_string(),
            maximum_lock_wait_seconds: 5,
            output_format: OutputFormat::Table,
            outbox_retention_days: 90,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_empty() {
        let config = Config::default();
        assert!(config.hold_ttl_minutes.is_none());
        assert!(config.retention.is_none());
    }

    #[test]
    fn test_minimal_config() {
        let yaml = "hold_ttl_minutes: 45\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.hold_ttl_minutes, Some(45));
        assert!(config.default_currency.is_none());
    }

    #[test]
    fn test_complete_config() {
        let yaml = r#"
hold_ttl_minutes: 20
default_currency: "USD"
maximum_lock_wait_seconds: 10
output_format: json
retention:
  outbox_days: 30
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.hold_ttl_minutes, Some(20));
        assert_eq!(config.default_currency, Some("USD".to_string()));
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(config.retention.unwrap().outbox_days, Some(30));
    }

    #[test]
    fn test_config_deny_unknown_fields() {
        let yaml = "hold_ttl_minutes: 30\nunknown_field: value\n";
        let result: Result<Config, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolved_defaults() {
        let resolved = ResolvedConfig::default();
        assert_eq!(resolved.hold_ttl_minutes, 30);
        assert_eq!(resolved.default_currency, "EUR");
        assert_eq!(resolved.outbox_retention_days, 90);
    }
}

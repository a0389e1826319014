//! Environment variable overrides for configuration.
//!
//! `INNKEEP_*` variables override file values and sit below only
//! programmatic overrides in precedence.

use std::env;

use crate::config::schema::{Config, OutputFormat};
use crate::error::{Error, Result};

/// Applies `INNKEEP_*` environment variable overrides.
///
/// # Examples
///
/// ```no_run
/// use innkeep::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Applies every recognized override to `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable does not parse.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(minutes) = env::var("INNKEEP_HOLD_TTL_MINUTES") {
            config.hold_ttl_minutes = Some(Self::parse_int("INNKEEP_HOLD_TTL_MINUTES", &minutes)?);
        }

        if let Ok(currency) = env::var("INNKEEP_DEFAULT_CURRENCY") {
            config.default_currency = Some(currency);
        }

        if let Ok(seconds) = env::var("INNKEEP_MAXIMUM_LOCK_WAIT_SECONDS") {
            config.maximum_lock_wait_seconds = Some(Self::parse_int(
                "INNKEEP_MAXIMUM_LOCK_WAIT_SECONDS",
                &seconds,
            )?);
        }

        if let Ok(format) = env::var("INNKEEP_OUTPUT_FORMAT") {
            config.output_format = Some(match format.to_lowercase().as_str() {
                "json" => OutputFormat::Json,
                "table" => OutputFormat::Table,
                other => {
                    return Err(Error::Validation {
                        field: "INNKEEP_OUTPUT_FORMAT".into(),
                        message: format!("'{other}' is not one of: json, table"),
                    })
                }
            });
        }

        if let Ok(days) = env::var("INNKEEP_OUTBOX_RETENTION_DAYS") {
            let retention = config.retention.get_or_insert_with(Default::default);
            retention.outbox_days = Some(Self::parse_int("INNKEEP_OUTBOX_RETENTION_DAYS", &days)?);
        }

        Ok(())
    }

    fn parse_int<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
        value.parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: "must be a positive integer".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment variables are process-global, so everything lives in
    // one test to keep the harness free to run tests in parallel.
    #[test]
    fn test_apply_overrides() {
        env::set_var("INNKEEP_HOLD_TTL_MINUTES", "45");
        env::set_var("INNKEEP_DEFAULT_CURRENCY", "CHF");
        env::set_var("INNKEEP_OUTPUT_FORMAT", "json");
        env::set_var("INNKEEP_OUTBOX_RETENTION_DAYS", "14");

        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config.hold_ttl_minutes, Some(45));
        assert_eq!(config.default_currency, Some("CHF".to_string()));
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(config.retention.unwrap().outbox_days, Some(14));

        env::set_var("INNKEEP_HOLD_TTL_MINUTES", "soon");
        let mut config = Config::default();
        assert!(EnvironmentConfig::apply_overrides(&mut config).is_err());

        env::set_var("INNKEEP_HOLD_TTL_MINUTES", "45");
        env::set_var("INNKEEP_OUTPUT_FORMAT", "yaml");
        let mut config = Config::default();
        assert!(EnvironmentConfig::apply_overrides(&mut config).is_err());

        for var in [
            "INNKEEP_HOLD_TTL_MINUTES",
            "INNKEEP_DEFAULT_CURRENCY",
            "INNKEEP_OUTPUT_FORMAT",
            "INNKEEP_OUTBOX_RETENTION_DAYS",
        ] {
            env::remove_var(var);
        }
    }
}

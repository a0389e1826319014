//! Programmatic configuration assembly.
//!
//! Precedence, highest to lowest: programmatic overrides, `INNKEEP_*`
//! environment variables, the user config file, built-in defaults.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::schema::{Config, ResolvedConfig};
use crate::error::{Error, Result};

/// Builds a [`ResolvedConfig`] from all configuration sources.
///
/// # Examples
///
/// ```
/// use innkeep::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .build()
///     .unwrap();
/// assert_eq!(config.hold_ttl_minutes, 30);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    skip_files: bool,
    skip_env: bool,
    overrides: Option<Config>,
}

impl ConfigBuilder {
    /// Creates a builder with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the user config from this data directory instead of the
    /// default one.
    #[must_use]
    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        self.data_dir = Some(dir.to_path_buf());
        self
    }

    /// Skips file-based configuration.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Skips environment variable overrides.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Applies programmatic overrides at the highest precedence.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides = Some(config);
        self
    }

    /// Assembles, validates, and resolves the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a source fails to load or a resolved value
    /// is out of range.
    pub fn build(self) -> Result<ResolvedConfig> {
        let mut merged = Config::default();

        if !self.skip_files {
            let file = ConfigLoader::load_user_config(self.data_dir.as_deref())?;
            merge_into(&mut merged, &file);
        }
        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut merged)?;
        }
        if let Some(ref overrides) = self.overrides {
            merge_into(&mut merged, overrides);
        }

        resolve(&merged)
    }
}

/// Merges `source` into `target`; set fields of `source` win.
fn merge_into(target: &mut Config, source: &Config) {
    if source.hold_ttl_minutes.is_some() {
        target.hold_ttl_minutes = source.hold_ttl_minutes;
    }
    if source.default_currency.is_some() {
        target.default_currency.clone_from(&source.default_currency);
    }
    if source.maximum_lock_wait_seconds.is_some() {
        target.maximum_lock_wait_seconds = source.maximum_lock_wait_seconds;
    }
    if source.output_format.is_some() {
        target.output_format = source.output_format;
    }
    if let Some(ref retention) = source.retention {
        if retention.outbox_days.is_some() {
            let target_retention = target.retention.get_or_insert_with(Default::default);
            target_retention.outbox_days = retention.outbox_days;
        }
    }
}

fn resolve(config: &Config) -> Result<ResolvedConfig> {
    let defaults = ResolvedConfig::default();
    let resolved = ResolvedConfig {
        hold_ttl_minutes: config.hold_ttl_minutes.unwrap_or(defaults.hold_ttl_minutes),
        default_currency: config
            .default_currency
            .clone()
            .unwrap_or(defaults.default_currency),
        maximum_lock_wait_seconds: config
            .maximum_lock_wait_seconds
            .unwrap_or(defaults.maximum_lock_wait_seconds),
        output_format: config.output_format.unwrap_or(defaults.output_format),
        outbox_retention_days: config
            .retention
            .as_ref()
            .and_then(|r| r.outbox_days)
            .unwrap_or(defaults.outbox_retention_days),
    };

    if resolved.hold_ttl_minutes < 1 {
        return Err(Error::Validation {
            field: "hold_ttl_minutes".into(),
            message: "must be at least 1".into(),
        });
    }
    if resolved.outbox_retention_days < 1 {
        return Err(Error::Validation {
            field: "retention.outbox_days".into(),
            message: "must be at least 1".into(),
        });
    }
    let currency = &resolved.default_currency;
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::Validation {
            field: "default_currency".into(),
            message: format!("'{currency}' is not a three-letter ISO 4217 code"),
        });
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{OutputFormat, RetentionConfig};
    use tempfile::TempDir;

    fn hermetic() -> ConfigBuilder {
        ConfigBuilder::new().skip_files().skip_env()
    }

    #[test]
    fn test_defaults() {
        let config = hermetic().build().unwrap();
        assert_eq!(config, ResolvedConfig::default());
    }

    #[test]
    fn test_programmatic_overrides_win() {
        let config = hermetic()
            .with_config(Config {
                hold_ttl_minutes: Some(10),
                output_format: Some(OutputFormat::Json),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(config.hold_ttl_minutes, 10);
        assert_eq!(config.output_format, OutputFormat::Json);
        // Untouched fields keep their defaults.
        assert_eq!(config.outbox_retention_days, 90);
    }

    #[test]
    fn test_file_then_override() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("config.yaml"),
            "hold_ttl_minutes: 20\ndefault_currency: \"USD\"\n",
        )
        .unwrap();

        let config = ConfigBuilder::new()
            .with_data_dir(temp_dir.path())
            .skip_env()
            .with_config(Config {
                hold_ttl_minutes: Some(15),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(config.hold_ttl_minutes, 15);
        assert_eq!(config.default_currency, "USD");
    }

    #[test]
    fn test_rejects_zero_ttl() {
        let result = hermetic()
            .with_config(Config {
                hold_ttl_minutes: Some(0),
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_currency() {
        let result = hermetic()
            .with_config(Config {
                default_currency: Some("euros".to_string()),
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_retention_merge() {
        let config = hermetic()
            .with_config(Config {
                retention: Some(RetentionConfig {
                    outbox_days: Some(7),
                }),
                ..Default::default()
            })
            .build()
            .unwrap();
        assert_eq!(config.outbox_retention_days, 7);
    }
}

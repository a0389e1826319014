//! Configuration file loading.
//!
//! A single user-level file at `{data_dir}/config.yaml`; there is no
//! per-project discovery, since the engine's data and configuration
//! live together under the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Loads configuration files.
///
/// # Examples
///
/// ```no_run
/// use innkeep::config::ConfigLoader;
///
/// let config = ConfigLoader::load_user_config(None).unwrap();
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the user configuration, if it exists.
    ///
    /// With `data_dir`, reads `{data_dir}/config.yaml`; otherwise uses
    /// the default data directory. A missing file yields the empty
    /// config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or
    /// parsed.
    pub fn load_user_config(data_dir: Option<&Path>) -> Result<Config> {
        let path = match data_dir {
            Some(dir) => dir.join("config.yaml"),
            None => Self::user_config_path()?,
        };
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_file(&path)
    }

    /// Loads and parses one YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is
    /// invalid or carries unknown fields.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| Error::Validation {
            field: path.display().to_string(),
            message: format!("invalid YAML: {e}"),
        })
    }

    fn user_config_path() -> Result<PathBuf> {
        let data_dir = crate::database::default_data_dir()?;
        Ok(data_dir.join("config.yaml"))
    }
}

use std::{fs, io::ErrorKind, path::Path};

use tracing::{debug, info};

use super::{Config, ConfigPaths};
use crate::{MediabarError, Result};

impl Config {
    /// Loads the configuration file at `path`
    ///
    /// A missing file yields the defaults. Fields missing from the file
    /// take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The TOML content is invalid
    /// - A value fails validation
    pub fn load(path: &Path) -> Result<Config> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            Err(e) => return Err(MediabarError::io(e, path)),
        };

        debug!("Loading config from {}", path.display());
        let config = Self::from_toml(&content).map_err(|e| match e {
            MediabarError::TomlParseError { details, .. } => {
                MediabarError::toml_parse(details, Some(path))
            }
            other => other,
        })?;

        Ok(config)
    }

    /// Loads the configuration from the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or
    /// [`Config::load`] fails.
    pub fn load_default() -> Result<Config> {
        let path = ConfigPaths::main_config().map_err(|e| MediabarError::IoError {
            path: "config.toml".into(),
            details: e.to_string(),
        })?;
        Self::load(&path)
    }

    /// Parses and validates configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a value fails validation.
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| MediabarError::toml_parse(e, None))?;
        config.media.validate()?;
        Ok(config)
    }
}

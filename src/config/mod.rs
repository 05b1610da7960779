//! Configuration schema definitions and validation.
//!
//! Everything is read from one TOML file; every field has a default, so an
//! empty or missing file is a valid configuration.

mod general;
mod loading;
mod media;
mod paths;

pub use general::{GeneralConfig, LogLevel};
pub use media::MediaConfig;
pub use paths::ConfigPaths;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for mediabar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Media module settings.
    #[serde(default)]
    pub media: MediaConfig,
}

impl Config {
    /// JSON schema of the configuration file.
    pub fn schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

#[cfg(test)]
mod tests;

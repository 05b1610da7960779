mod log_level;

pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General configuration settings for mediabar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct GeneralConfig {
    /// Default logging level, overridden by `RUST_LOG`.
    #[serde(default)]
    pub log_level: LogLevel,
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{MediabarError, Result};

/// Media module configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MediaConfig {
    /// Comma-separated bus name fragments of players to ignore (case-insensitive)
    pub ignored_players: String,

    /// Scroll titles wider than `title_max_width`; cut them otherwise
    pub scroll_title: bool,

    /// Milliseconds between marquee steps
    pub scroll_interval_ms: u64,

    /// Characters the marquee moves per step
    pub scroll_step: usize,

    /// Seconds the marquee holds at the start before scrolling
    pub scroll_before_timeout_s: u64,

    /// Visible title width in characters
    pub title_max_width: usize,

    /// Milliseconds a stopped player stays visible before it is hidden
    pub stopped_grace_ms: u64,

    /// Milliseconds between position estimates while playing
    pub position_poll_ms: u64,

    /// Emit a tooltip with the full title and player name
    pub tooltip: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ignored_players: String::new(),
            scroll_title: true,
            scroll_interval_ms: 200,
            scroll_step: 2,
            scroll_before_timeout_s: 5,
            title_max_width: 40,
            stopped_grace_ms: 2000,
            position_poll_ms: 250,
            tooltip: true,
        }
    }
}

impl MediaConfig {
    /// Reject values the marquee and timers cannot work with.
    ///
    /// # Errors
    /// Returns `MediabarError::ConfigValidation` naming the first bad field
    pub fn validate(&self) -> Result<()> {
        let zero = [
            ("scroll_interval_ms", self.scroll_interval_ms == 0),
            ("scroll_step", self.scroll_step == 0),
            ("title_max_width", self.title_max_width == 0),
            ("position_poll_ms", self.position_poll_ms == 0),
        ];

        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(MediabarError::validation(
                "media",
                format!("{field} must be greater than zero"),
            )),
            None => Ok(()),
        }
    }
}

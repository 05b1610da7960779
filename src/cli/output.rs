//! JSON lines for waybar `custom` modules.

use serde::Serialize;

use crate::{
    config::MediaConfig,
    services::mpris::{DisplayState, PlaybackState},
};

/// One line of waybar module output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaybarOutput {
    /// Label text
    pub text: String,

    /// Hover text, omitted when tooltips are disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,

    /// CSS class: `playing`, `paused`, `stopped` or `no-player`
    pub class: &'static str,

    /// Track progress in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,

    /// Format alternative, the play/pause glyph name
    pub alt: &'static str,
}

impl WaybarOutput {
    /// Render a display snapshot.
    pub fn from_display(display: &DisplayState, config: &MediaConfig) -> Self {
        let Some(player) = &display.player else {
            return Self {
                text: String::new(),
                tooltip: None,
                class: "no-player",
                percentage: None,
                alt: "none",
            };
        };

        let class = match display.state {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped | PlaybackState::Idle => "stopped",
        };

        let alt = if display.state == PlaybackState::Playing {
            "pause"
        } else {
            "play"
        };

        let tooltip = config.tooltip.then(|| {
            let mut lines = vec![
                display.title.clone(),
                format!("{} {}", player.short_name(), display.index_label),
            ];
            if let Some(path) = display.art_url.strip_prefix("file://") {
                lines.push(path.to_string());
            }
            lines.join("\n")
        });

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percentage = display
            .position_ratio
            .map(|ratio| (ratio * 100.0).round() as u8);

        Self {
            text: format!("{} {}", display.index_label, display.visible_title),
            tooltip,
            class,
            percentage,
            alt,
        }
    }

    /// Serialize as a single JSON line.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#![allow(missing_docs)]

use std::collections::HashMap;
use zbus::{Result, proxy, zvariant::OwnedValue};

/// MPRIS MediaPlayer2.Player interface proxy
///
/// Only the members the aggregation core consumes: the six playback methods,
/// the `Seeked` signal, playback status, metadata, capability flags and the
/// uncached `Position` property.
#[proxy(
    interface = "org.mpris.MediaPlayer2.Player",
    default_service = "org.mpris.MediaPlayer2",
    default_path = "/org/mpris/MediaPlayer2"
)]
pub trait MediaPlayer2Player {
    /// Start playback
    fn play(&self) -> Result<()>;

    /// Pause playback
    fn pause(&self) -> Result<()>;

    /// Toggle play/pause state
    fn play_pause(&self) -> Result<()>;

    /// Stop playback
    fn stop(&self) -> Result<()>;

    /// Skip to next track
    fn next(&self) -> Result<()>;

    /// Skip to previous track
    fn previous(&self) -> Result<()>;

    /// Signal emitted when the player jumps to a new position
    #[zbus(signal)]
    fn seeked(&self, position: i64) -> Result<()>;

    /// Current playback status (Playing, Paused, Stopped)
    #[zbus(property)]
    fn playback_status(&self) -> Result<String>;

    /// Current track metadata
    #[zbus(property)]
    fn metadata(&self) -> Result<HashMap<String, OwnedValue>>;

    /// Current playback position in microseconds
    ///
    /// Players do not emit change signals for this property, so every read
    /// is a bus round trip.
    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> Result<i64>;

    /// Whether the player can skip to next track
    #[zbus(property)]
    fn can_go_next(&self) -> Result<bool>;

    /// Whether the player can skip to previous track
    #[zbus(property)]
    fn can_go_previous(&self) -> Result<bool>;

    /// Whether the player can start playback
    #[zbus(property)]
    fn can_play(&self) -> Result<bool>;

    /// Whether the player can be controlled
    #[zbus(property)]
    fn can_control(&self) -> Result<bool>;
}

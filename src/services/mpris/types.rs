use std::fmt;

/// Well-known bus name prefix reserved for MPRIS media players.
pub const MPRIS_BUS_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Unique identifier for a media player
///
/// Wraps the player's bus name. Two handles are the same player exactly when
/// their bus names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create a PlayerId from a D-Bus bus name
    pub fn from_bus_name(bus_name: &str) -> Self {
        Self(bus_name.to_string())
    }

    /// Get the D-Bus bus name
    pub fn bus_name(&self) -> &str {
        &self.0
    }

    /// Short player name with the MPRIS prefix and instance suffix removed.
    ///
    /// "org.mpris.MediaPlayer2.firefox.instance_1_234" -> "firefox"
    pub fn short_name(&self) -> &str {
        self.0
            .strip_prefix(MPRIS_BUS_PREFIX)
            .and_then(|rest| rest.split('.').next())
            .unwrap_or(&self.0)
    }

    /// Whether a bus name belongs to an MPRIS player.
    pub fn is_mpris_name(bus_name: &str) -> bool {
        bus_name.starts_with(MPRIS_BUS_PREFIX)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current playback state of a media player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Player reported no usable status
    #[default]
    Idle,

    /// Player is stopped
    Stopped,

    /// Player is paused
    Paused,

    /// Player is currently playing
    Playing,
}

impl From<&str> for PlaybackState {
    fn from(status: &str) -> Self {
        match status {
            "Playing" => Self::Playing,
            "Paused" => Self::Paused,
            "Stopped" => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Playing => write!(f, "playing"),
        }
    }
}

/// Control capabilities advertised by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerCapabilities {
    /// Can start playback
    pub can_play: bool,

    /// Accepts any control command at all
    pub can_control: bool,

    /// Can skip to next track
    pub can_go_next: bool,

    /// Can go to previous track
    pub can_go_previous: bool,
}

/// Playback commands forwarded to a player's bus interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// `Play`
    Play,
    /// `Pause`
    Pause,
    /// `Stop`
    Stop,
    /// `PlayPause`
    PlayPause,
    /// `Next`
    Next,
    /// `Previous`
    Previous,
}

impl PlayerCommand {
    /// Bus method name invoked for this command.
    pub fn method_name(self) -> &'static str {
        match self {
            PlayerCommand::Play => "Play",
            PlayerCommand::Pause => "Pause",
            PlayerCommand::Stop => "Stop",
            PlayerCommand::PlayPause => "PlayPause",
            PlayerCommand::Next => "Next",
            PlayerCommand::Previous => "Previous",
        }
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

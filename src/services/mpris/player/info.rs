use crate::services::mpris::{PlaybackState, PlayerCapabilities, metadata::TrackMetadata};

/// Snapshot of a player's bus properties at one point in time.
///
/// `metadata` is `None` when the player exposed no `Metadata` property at
/// all, which is different from exposing an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Playback status
    pub state: PlaybackState,

    /// Track metadata, when present
    pub metadata: Option<TrackMetadata>,

    /// Capability flags
    pub capabilities: PlayerCapabilities,
}

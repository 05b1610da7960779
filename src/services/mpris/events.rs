use tokio::sync::mpsc;

use super::{
    MediaError, PlayerCommand, PlayerId, backend::OpenedPlayer, player::PlayerInfo,
};

/// Sender half of the media service event channel.
pub type EventSender = mpsc::UnboundedSender<MediaEvent>;

/// Receiver half of the media service event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<MediaEvent>;

/// Everything the media service event loop reacts to.
///
/// Bus watchers, timers and the public service API all post into the same
/// channel, so the loop handles them strictly in arrival order.
#[derive(Debug)]
pub enum MediaEvent {
    /// An MPRIS bus name gained or lost its owner
    NameOwnerChanged {
        /// Player the name belongs to
        id: PlayerId,
        /// `true` when the name gained an owner
        appeared: bool,
    },

    /// A player proxy finished connecting after its name appeared
    PlayerOpened {
        /// Player that was opened
        id: PlayerId,
        /// Connected player or the reason it could not be tracked
        result: Result<OpenedPlayer, MediaError>,
    },

    /// Something happened to a tracked player
    Player {
        /// Player the event is scoped to
        id: PlayerId,
        /// What happened
        event: PlayerEvent,
    },

    /// Forward a playback command to the current player
    Command(PlayerCommand),

    /// Cycle the current player to the next available one
    SelectNext,

    /// Stop the event loop
    Shutdown,
}

/// Events scoped to a single player handle.
#[derive(Debug)]
pub enum PlayerEvent {
    /// Fresh snapshot read from the proxy property cache
    Refreshed(PlayerInfo),

    /// The player jumped to a new position (µs)
    Seeked(i64),

    /// Reply to an asynchronous position query (µs)
    PositionQueried(i64),

    /// Position ticker fired
    PositionTick,

    /// Stopped grace timer fired for the given arm generation
    GraceExpired(u64),
}

//! Seams between the aggregation core and the message bus.
//!
//! The registry only talks to the bus through [`PlayerBackend`], and each
//! player handle only through its [`PlayerLink`]. [`SessionBus`] is the real
//! implementation; tests swap in in-memory fakes.

mod session;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tokio::task::JoinHandle;

pub use session::SessionBus;

use super::{EventSender, MediaError, PlayerCommand, PlayerId, player::PlayerInfo};

/// Player discovery and connection.
#[async_trait]
pub trait PlayerBackend: Send + Sync + 'static {
    /// Enumerate every MPRIS player currently owning a name on the bus.
    ///
    /// # Errors
    /// Returns error if the bus connection or the name listing fails
    async fn list_players(&self) -> Result<Vec<PlayerId>, MediaError>;

    /// Subscribe to name ownership changes.
    ///
    /// Every change to an MPRIS name is posted as
    /// [`MediaEvent::NameOwnerChanged`](super::MediaEvent::NameOwnerChanged)
    /// until the returned task is aborted.
    ///
    /// # Errors
    /// Returns error if the bus connection or the signal subscription fails
    async fn watch_players(&self, events: EventSender) -> Result<JoinHandle<()>, MediaError>;

    /// Connect to a single player and read its initial snapshot.
    ///
    /// # Errors
    /// Returns error if the player proxy cannot be created
    async fn open_player(&self, id: &PlayerId) -> Result<OpenedPlayer, MediaError>;
}

/// Connection to one player on the bus.
#[async_trait]
pub trait PlayerLink: Send + Sync + 'static {
    /// Invoke the bus method matching `command`.
    ///
    /// # Errors
    /// Returns error if the method call fails
    async fn send(&self, command: PlayerCommand) -> Result<(), MediaError>;

    /// Query the current playback position in microseconds.
    ///
    /// # Errors
    /// Returns error if the property read fails
    async fn query_position(&self) -> Result<i64, MediaError>;

    /// Start forwarding property changes and seeks as player events.
    ///
    /// The task posts a fresh [`PlayerInfo`] once its subscriptions are in
    /// place, then again after every change.
    fn monitor(&self, id: PlayerId, events: EventSender) -> JoinHandle<()>;
}

/// A player that was successfully connected.
pub struct OpenedPlayer {
    /// Snapshot read while connecting
    pub info: PlayerInfo,

    /// Link used for commands, position queries and monitoring
    pub link: Arc<dyn PlayerLink>,
}

impl fmt::Debug for OpenedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedPlayer")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

use std::sync::Arc;

use tracing::{debug, warn};

use crate::services::mpris::{PlayerCommand, PlayerId, backend::PlayerLink};

/// Issue a playback command without waiting for the player to answer.
///
/// The reply is only used for logging. Local state is never updated from
/// here; the player's own property change notifications carry the result.
pub(crate) fn dispatch(link: Arc<dyn PlayerLink>, id: PlayerId, command: PlayerCommand) {
    debug!(player = %id, %command, "Dispatching player command");

    tokio::spawn(async move {
        if let Err(e) = link.send(command).await {
            warn!(player = %id, %command, "Player command failed: {e}");
        }
    });
}

use super::PlayerId;

/// Errors that can occur during media operations
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    /// Player with the given ID was not found
    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// D-Bus standard interface error
    #[error("D-Bus fdo operation failed: {0}")]
    FdoError(#[from] zbus::fdo::Error),

    /// Player did not answer within the call timeout
    #[error("Player {0} not responding")]
    PlayerUnresponsive(PlayerId),

    /// Failed to initialize the media service
    #[error("Failed to initialize media service: {0}")]
    InitializationFailed(String),

    /// Failed to control the player
    #[error("Failed to control player: {0}")]
    ControlFailed(String),

    /// The media service event loop is gone
    #[error("Media service is not running")]
    ServiceStopped,
}

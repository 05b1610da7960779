use std::str::FromStr;

use crate::services::mpris::{MediaError, MediaRemote, PlayerCommand};

/// A command from the control socket or stdin, usually sent by a waybar
/// `on-click` handler through `mediabar ctl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarCommand {
    /// Forward a playback command to the current player
    Player(PlayerCommand),

    /// Cycle to the next available player
    SelectNext,
}

impl BarCommand {
    /// Hand the command to the media service.
    ///
    /// # Errors
    /// Returns `MediaError::ServiceStopped` if the service has shut down
    pub fn apply(self, remote: &MediaRemote) -> Result<(), MediaError> {
        match self {
            BarCommand::Player(command) => remote.command(command),
            BarCommand::SelectNext => remote.select_next(),
        }
    }
}

/// Input line that names no known command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for BarCommand {
    type Err = UnknownCommand;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let command = match line.trim().to_lowercase().as_str() {
            "play" => BarCommand::Player(PlayerCommand::Play),
            "pause" => BarCommand::Player(PlayerCommand::Pause),
            "stop" => BarCommand::Player(PlayerCommand::Stop),
            "play-pause" | "toggle" => BarCommand::Player(PlayerCommand::PlayPause),
            "next" => BarCommand::Player(PlayerCommand::Next),
            "previous" | "prev" => BarCommand::Player(PlayerCommand::Previous),
            "select-next" | "switch" => BarCommand::SelectNext,
            _ => return Err(UnknownCommand(line.trim().to_string())),
        };

        Ok(command)
    }
}

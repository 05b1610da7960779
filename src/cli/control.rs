//! Control socket shared by `mediabar run` and `mediabar ctl`.
//!
//! One command per line. Every line is answered with `ok` or
//! `error: <reason>`.

use std::{
    fs, io,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{UnixListener, UnixStream},
};
use tracing::{debug, info, warn};

use super::{BarCommand, UnknownCommand};
use crate::services::mpris::{MediaError, MediaRemote};

/// Failures on either end of the control socket.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Nothing listens on the socket
    #[error("no running mediabar at {path}: {source}")]
    NotRunning {
        /// Socket that was tried
        path: PathBuf,
        /// Connect error
        source: io::Error,
    },

    /// The line names no known command
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),

    /// The media service could not take the command
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The running instance refused the command
    #[error("command rejected: {0}")]
    Rejected(String),

    /// Socket I/O failed mid-conversation
    #[error("control socket I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Listening end of the control socket.
///
/// The socket file is removed when the server is dropped.
#[derive(Debug)]
pub struct ControlServer {
    listener: UnixListener,
    path: PathBuf,
}

impl ControlServer {
    /// Bind `path`, replacing a socket left behind by an earlier run.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns error if the stale socket cannot be removed or the new one
    /// cannot be bound
    pub fn bind(path: &Path) -> io::Result<Self> {
        match fs::remove_file(path) {
            Ok(()) => debug!("Removed stale control socket {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(path)?;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        info!("Control socket listening at {}", path.display());

        Ok(Self {
            listener,
            path: path.to_path_buf(),
        })
    }

    /// Socket path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept clients until the task is aborted.
    pub async fn serve(self, remote: MediaRemote) {
        loop {
            match self.listener.accept().await {
                Ok((stream, _)) => {
                    let remote = remote.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, &remote).await {
                            debug!("Control client dropped: {e}");
                        }
                    });
                }
                Err(e) => {
                    warn!("Control socket accept failed: {e}");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

async fn handle_client(stream: UnixStream, remote: &MediaRemote) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match execute(&line, remote) {
            Ok(()) => "ok\n".to_string(),
            Err(e) => {
                debug!("Rejected control command: {e}");
                format!("error: {e}\n")
            }
        };
        writer.write_all(reply.as_bytes()).await?;
    }

    Ok(())
}

fn execute(line: &str, remote: &MediaRemote) -> Result<(), ControlError> {
    let command: BarCommand = line.parse()?;
    debug!(?command, "Command from control socket");
    command.apply(remote)?;
    Ok(())
}

/// Send one command to the instance listening on `path` and wait for the
/// answer.
///
/// # Errors
/// Returns `ControlError::NotRunning` when nothing listens on `path` and
/// `ControlError::Rejected` when the instance refuses the command
pub async fn send_command(path: &Path, command: &str) -> Result<(), ControlError> {
    let stream = UnixStream::connect(path)
        .await
        .map_err(|source| ControlError::NotRunning {
            path: path.to_path_buf(),
            source,
        })?;
    let (reader, mut writer) = stream.into_split();

    writer
        .write_all(format!("{}\n", command.trim()).as_bytes())
        .await?;
    writer.shutdown().await?;

    let mut reply = String::new();
    BufReader::new(reader).read_line(&mut reply).await?;

    match reply.trim() {
        "ok" => Ok(()),
        "" => Err(ControlError::Rejected("connection closed without reply".into())),
        other => Err(ControlError::Rejected(
            other.strip_prefix("error: ").unwrap_or(other).to_string(),
        )),
    }
}

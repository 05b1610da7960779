use std::{sync::Arc, time::Duration};

use futures::Stream;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, instrument};

use super::{
    EventReceiver, EventSender, MediaError, MediaEvent, PlaybackState, PlayerCommand, PlayerEvent,
    PlayerId,
    backend::{PlayerBackend, SessionBus},
    controller::{Controller, DisplayState, Marquee, Notifications, title_line},
    player::{PlayerChanges, PlayerSettings},
    registry::PlayerRegistry,
};
use crate::{config::MediaConfig, services::common::Property};

/// One line of the player overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    /// Player identity
    pub id: PlayerId,

    /// Playback state
    pub state: PlaybackState,

    /// Whether the player counts toward selection
    pub available: bool,

    /// Whether the player is the current one
    pub current: bool,

    /// Formatted title line
    pub title: String,
}

/// Cloneable command handle for a running [`MediaService`].
///
/// Lets tasks other than the service owner, such as the control socket,
/// post commands into the event loop.
#[derive(Debug, Clone)]
pub struct MediaRemote {
    events: EventSender,
}

impl MediaRemote {
    /// Forward a playback command to the current player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn command(&self, command: PlayerCommand) -> Result<(), MediaError> {
        self.send(MediaEvent::Command(command))
    }

    /// Cycle to the next available player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn select_next(&self) -> Result<(), MediaError> {
        self.send(MediaEvent::SelectNext)
    }

    fn send(&self, event: MediaEvent) -> Result<(), MediaError> {
        self.events
            .send(event)
            .map_err(|_| MediaError::ServiceStopped)
    }
}

/// Aggregates every MPRIS player into a single current-player view.
///
/// A background task owns the registry and the controller and handles
/// bus events, timers and commands in arrival order. The public API only
/// posts events into that task and reads the published [`Property`]s.
pub struct MediaService {
    remote: MediaRemote,
    display: Property<DisplayState>,
    selection: Property<Option<PlayerId>>,
    players: Property<Vec<PlayerSummary>>,
    task: JoinHandle<()>,
}

impl MediaService {
    /// Start the service on the D-Bus session bus.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::InitializationFailed` if the bus connection fails
    /// and `MediaError::DbusError` if the initial player enumeration fails.
    pub async fn start(config: &MediaConfig) -> Result<Self, MediaError> {
        Self::start_with_backend(config, Arc::new(SessionBus::new())).await
    }

    /// Start the service on an arbitrary backend.
    ///
    /// Enumerates the players already present before returning, so the
    /// first [`display`](Self::display) reflects them.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot subscribe to ownership changes or
    /// list the current players.
    #[instrument(skip_all)]
    pub async fn start_with_backend(
        config: &MediaConfig,
        backend: Arc<dyn PlayerBackend>,
    ) -> Result<Self, MediaError> {
        info!("Starting media service");

        let (events, receiver) = mpsc::unbounded_channel();
        let mut registry =
            PlayerRegistry::new(backend, events.clone(), PlayerSettings::from(config));
        let mut controller = Controller::new(config);

        registry.start(&mut controller).await?;
        controller.take_notifications();

        let display = Property::new(controller.display(registry.players()));
        let selection = Property::new(controller.current().cloned());
        let players = Property::new(summarize(&registry, &controller));

        let event_loop = EventLoop {
            registry,
            controller,
            display: display.clone(),
            selection: selection.clone(),
            players: players.clone(),
            scroll_interval: Marquee::interval(config),
            summary_stale: false,
        };
        let task = tokio::spawn(event_loop.run(receiver));

        info!("Media service started");
        Ok(Self {
            remote: MediaRemote { events },
            display,
            selection,
            players,
            task,
        })
    }

    /// Latest display snapshot.
    pub fn display(&self) -> DisplayState {
        self.display.get()
    }

    /// Stream of display snapshots, starting with the current one.
    ///
    /// This is the "display should refresh" hook.
    pub fn watch_display(&self) -> impl Stream<Item = DisplayState> + Send + use<> {
        self.display.watch()
    }

    /// Current player, if any.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.selection.get()
    }

    /// Stream of current-player changes, starting with the current one.
    ///
    /// This is the "selection changed" hook.
    pub fn watch_selection(&self) -> impl Stream<Item = Option<PlayerId>> + Send + use<> {
        self.selection.watch()
    }

    /// Every tracked player, including ignored ones.
    pub fn players(&self) -> Vec<PlayerSummary> {
        self.players.get()
    }

    /// Stream of player overviews.
    pub fn watch_players(&self) -> impl Stream<Item = Vec<PlayerSummary>> + Send + use<> {
        self.players.watch()
    }

    /// Forward a playback command to the current player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn command(&self, command: PlayerCommand) -> Result<(), MediaError> {
        self.remote.command(command)
    }

    /// Toggle play/pause on the current player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn play_pause(&self) -> Result<(), MediaError> {
        self.command(PlayerCommand::PlayPause)
    }

    /// Skip to the next track on the current player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn next(&self) -> Result<(), MediaError> {
        self.command(PlayerCommand::Next)
    }

    /// Go back to the previous track on the current player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn previous(&self) -> Result<(), MediaError> {
        self.command(PlayerCommand::Previous)
    }

    /// Cycle to the next available player.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::ServiceStopped` if the event loop has ended.
    pub fn select_next(&self) -> Result<(), MediaError> {
        self.remote.select_next()
    }

    /// Command handle that outlives borrows of the service.
    pub fn remote(&self) -> MediaRemote {
        self.remote.clone()
    }

    /// Stop the event loop and wait for it to finish.
    ///
    /// Dropping the registry tears down every player handle.
    pub async fn shutdown(mut self) {
        if self.remote.send(MediaEvent::Shutdown).is_ok() {
            let _ = (&mut self.task).await;
        }
    }
}

impl Drop for MediaService {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct EventLoop {
    registry: PlayerRegistry,
    controller: Controller,
    display: Property<DisplayState>,
    selection: Property<Option<PlayerId>>,
    players: Property<Vec<PlayerSummary>>,
    scroll_interval: Option<Duration>,
    /// Player overview needs rebuilding before the next publish
    summary_stale: bool,
}

impl EventLoop {
    async fn run(mut self, mut events: EventReceiver) {
        let period = self.scroll_interval.unwrap_or(Duration::from_secs(3600));
        let mut marquee = time::interval_at(time::Instant::now() + period, period);
        marquee.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(MediaEvent::Shutdown) | None => break,
                    Some(event) => self.handle(event),
                },
                _ = marquee.tick(), if self.scroll_interval.is_some() => {
                    self.controller.marquee_tick(self.registry.players());
                }
            }

            self.publish();
        }

        debug!("Media event loop ended");
    }

    fn handle(&mut self, event: MediaEvent) {
        if matches!(
            event,
            MediaEvent::NameOwnerChanged { .. } | MediaEvent::PlayerOpened { .. }
        ) {
            self.summary_stale = true;
        }

        match event {
            MediaEvent::NameOwnerChanged { id, appeared: true } => {
                self.registry.name_appeared(id);
            }
            MediaEvent::NameOwnerChanged {
                id,
                appeared: false,
            } => {
                self.registry.name_vanished(&id, &mut self.controller);
            }
            MediaEvent::PlayerOpened { id, result } => {
                self.registry
                    .player_opened(id, result, &mut self.controller);
            }
            MediaEvent::Player { id, event } => self.handle_player(&id, event),
            MediaEvent::Command(command) => {
                let handle = self
                    .controller
                    .current()
                    .and_then(|id| self.registry.players().get(id));

                match handle {
                    Some(handle) => handle.command(command),
                    None => debug!(%command, "No current player for command"),
                }
            }
            MediaEvent::SelectNext => {
                self.controller
                    .select_next_player(self.registry.players());
            }
            MediaEvent::Shutdown => {}
        }
    }

    fn handle_player(&mut self, id: &PlayerId, event: PlayerEvent) {
        let Some(handle) = self.registry.get_mut(id) else {
            return;
        };

        let changes = match event {
            PlayerEvent::Refreshed(info) => handle.refresh_info(info),
            PlayerEvent::Seeked(position) => handle.on_seeked(position),
            PlayerEvent::PositionQueried(position) => handle.on_position_reply(position),
            PlayerEvent::PositionTick => handle.tick(),
            PlayerEvent::GraceExpired(epoch) => handle.expire_grace(epoch),
        };

        self.summary_stale |= affects_summary(changes);
        self.controller
            .on_player_changed(id, changes, self.registry.players());
    }

    fn publish(&mut self) {
        let notifications = self.controller.take_notifications();

        if notifications.contains(Notifications::SELECTION_CHANGED) {
            self.selection.set(self.controller.current().cloned());
            self.summary_stale = true;
        }

        if notifications.contains(Notifications::REFRESH) {
            self.display
                .set(self.controller.display(self.registry.players()));
        }

        if self.summary_stale {
            self.players
                .set(summarize(&self.registry, &self.controller));
            self.summary_stale = false;
        }
    }
}

/// Position moves alone never show up in the player overview.
fn affects_summary(changes: PlayerChanges) -> bool {
    !changes.difference(PlayerChanges::POSITION).is_empty()
}

fn summarize(registry: &PlayerRegistry, controller: &Controller) -> Vec<PlayerSummary> {
    registry
        .players()
        .iter()
        .map(|handle| PlayerSummary {
            id: handle.id().clone(),
            state: handle.state(),
            available: handle.is_available(),
            current: controller.current() == Some(handle.id()),
            title: title_line(handle.artist(), handle.title()),
        })
        .collect()
}

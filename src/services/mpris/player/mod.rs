//! Per-player state tracking.

mod control;
mod info;
pub(crate) mod monitoring;
mod position;

use std::{sync::Arc, time::Duration};

use bitflags::bitflags;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, instrument};

pub use info::PlayerInfo;
use position::PositionClock;

use super::{
    EventSender, MediaError, MediaEvent, PlaybackState, PlayerCapabilities, PlayerCommand, PlayerEvent,
    PlayerId,
    backend::{OpenedPlayer, PlayerLink},
    metadata::TrackMetadata,
};
use crate::config::MediaConfig;

/// Position queries that take longer than this count as "no update this cycle".
pub const POSITION_QUERY_TIMEOUT: Duration = Duration::from_secs(1);

bitflags! {
    /// What changed on a player after handling one event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PlayerChanges: u8 {
        /// Some snapshot field changed
        const PROPERTY = 1 << 0;
        /// Playback state transitioned
        const STATE = 1 << 1;
        /// The player reported metadata
        const METADATA = 1 << 2;
        /// The exposed position moved
        const POSITION = 1 << 3;
        /// The availability predicate flipped
        const AVAILABILITY = 1 << 4;
    }
}

/// Timing knobs shared by every player handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSettings {
    /// How long a stopped player stays available
    pub stopped_grace: Duration,

    /// Interval of the position ticker while playing
    pub position_poll: Duration,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::from(&MediaConfig::default())
    }
}

impl From<&MediaConfig> for PlayerSettings {
    fn from(config: &MediaConfig) -> Self {
        Self {
            stopped_grace: Duration::from_millis(config.stopped_grace_ms),
            position_poll: Duration::from_millis(config.position_poll_ms.max(1)),
        }
    }
}

/// Live model of one MPRIS player.
///
/// Owns the bus monitor, the position ticker and the stopped grace timer;
/// all three are aborted when the handle is dropped.
pub struct PlayerHandle {
    id: PlayerId,
    link: Arc<dyn PlayerLink>,
    events: EventSender,
    settings: PlayerSettings,

    state: PlaybackState,
    track: TrackMetadata,
    capabilities: PlayerCapabilities,
    clock: PositionClock,

    grace_expired: bool,
    grace_epoch: u64,

    monitor: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,
    grace_timer: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    /// Build a handle around a connected player and start monitoring it.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(opened, events, settings), fields(player = %id))]
    pub fn new(
        id: PlayerId,
        opened: OpenedPlayer,
        events: EventSender,
        settings: PlayerSettings,
    ) -> Self {
        let monitor = opened.link.monitor(id.clone(), events.clone());

        let mut handle = Self {
            id,
            link: opened.link,
            events,
            settings,
            state: PlaybackState::Idle,
            track: TrackMetadata::default(),
            capabilities: PlayerCapabilities::default(),
            clock: PositionClock::new(0),
            grace_expired: false,
            grace_epoch: 0,
            monitor: Some(monitor),
            ticker: None,
            grace_timer: None,
        };

        handle.refresh_info(opened.info);
        handle
    }

    /// Player identity.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Current playback state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Track title.
    pub fn title(&self) -> &str {
        &self.track.title
    }

    /// First track artist.
    pub fn artist(&self) -> &str {
        &self.track.artist
    }

    /// Artwork URL, empty when unknown.
    pub fn art_url(&self) -> &str {
        &self.track.art_url
    }

    /// Track length in microseconds, 0 when unknown.
    pub fn length(&self) -> i64 {
        self.track.length
    }

    /// Estimated playback position in microseconds.
    pub fn position(&self) -> i64 {
        self.clock.exposed()
    }

    /// Capability flags.
    pub fn capabilities(&self) -> PlayerCapabilities {
        self.capabilities
    }

    /// Whether this player counts toward selection and display.
    pub fn is_available(&self) -> bool {
        self.state != PlaybackState::Idle
            && self.capabilities.can_control
            && self.capabilities.can_play
            && (!self.track.artist.trim().is_empty() || !self.track.title.trim().is_empty())
            && !self.grace_expired
    }

    /// Apply a snapshot read from the proxy property cache.
    ///
    /// Also issues an asynchronous position query whose reply arrives later
    /// as [`PlayerEvent::PositionQueried`].
    pub fn refresh_info(&mut self, info: PlayerInfo) -> PlayerChanges {
        let was_available = self.is_available();
        let mut changes = PlayerChanges::empty();

        if info.state != self.state {
            changes |= PlayerChanges::STATE | PlayerChanges::PROPERTY;
            self.enter_state(info.state);
        }

        if let Some(track) = info.metadata {
            changes |= PlayerChanges::METADATA;
            if track != self.track {
                changes |= PlayerChanges::PROPERTY;
                self.track = track;
            }
        }

        if info.capabilities != self.capabilities {
            changes |= PlayerChanges::PROPERTY;
            self.capabilities = info.capabilities;
        }

        self.query_position();

        changes | self.availability_change(was_available)
    }

    /// Take a position announced by the `Seeked` signal.
    pub fn on_seeked(&mut self, position: i64) -> PlayerChanges {
        self.clock.seek(position, Instant::now());
        PlayerChanges::POSITION
    }

    /// Take the reply to a position query.
    pub fn on_position_reply(&mut self, position: i64) -> PlayerChanges {
        if self.clock.correct(position, Instant::now()) {
            PlayerChanges::POSITION
        } else {
            PlayerChanges::empty()
        }
    }

    /// Re-estimate the position on a ticker beat.
    pub fn tick(&mut self) -> PlayerChanges {
        if self.clock.is_running() && self.clock.tick(Instant::now()) {
            PlayerChanges::POSITION
        } else {
            PlayerChanges::empty()
        }
    }

    /// Mark a stopped player as expired when its grace timer fires.
    ///
    /// Timers from an earlier stop are recognised by their epoch and ignored.
    pub fn expire_grace(&mut self, epoch: u64) -> PlayerChanges {
        if epoch != self.grace_epoch || self.state != PlaybackState::Stopped || self.grace_expired
        {
            return PlayerChanges::empty();
        }

        debug!(player = %self.id, "Stopped grace period elapsed");
        let was_available = self.is_available();
        self.grace_expired = true;
        self.grace_timer = None;

        PlayerChanges::PROPERTY | self.availability_change(was_available)
    }

    /// Forward a playback command to the player.
    pub fn command(&self, command: PlayerCommand) {
        control::dispatch(Arc::clone(&self.link), self.id.clone(), command);
    }

    /// Start playback.
    pub fn play(&self) {
        self.command(PlayerCommand::Play);
    }

    /// Pause playback.
    pub fn pause(&self) {
        self.command(PlayerCommand::Pause);
    }

    /// Stop playback.
    pub fn stop(&self) {
        self.command(PlayerCommand::Stop);
    }

    /// Toggle between playing and paused.
    pub fn play_pause(&self) {
        self.command(PlayerCommand::PlayPause);
    }

    /// Skip to the next track.
    pub fn next(&self) {
        self.command(PlayerCommand::Next);
    }

    /// Go back to the previous track.
    pub fn previous(&self) {
        self.command(PlayerCommand::Previous);
    }

    fn availability_change(&self, was_available: bool) -> PlayerChanges {
        if was_available != self.is_available() {
            PlayerChanges::AVAILABILITY
        } else {
            PlayerChanges::empty()
        }
    }

    fn enter_state(&mut self, state: PlaybackState) {
        debug!(player = %self.id, from = %self.state, to = %state, "Playback state changed");
        let now = Instant::now();
        self.state = state;

        self.grace_expired = false;
        if let Some(timer) = self.grace_timer.take() {
            timer.abort();
        }

        if state == PlaybackState::Playing {
            self.clock.start(now);
            self.start_ticker();
        } else {
            self.clock.stop(now);
            if let Some(ticker) = self.ticker.take() {
                ticker.abort();
            }
        }

        if state == PlaybackState::Stopped {
            self.arm_grace_timer();
        }
    }

    fn start_ticker(&mut self) {
        let period = self.settings.position_poll;
        let id = self.id.clone();
        let events = self.events.clone();

        let ticker = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let event = MediaEvent::Player {
                    id: id.clone(),
                    event: PlayerEvent::PositionTick,
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        });

        if let Some(previous) = self.ticker.replace(ticker) {
            previous.abort();
        }
    }

    fn arm_grace_timer(&mut self) {
        self.grace_epoch += 1;
        let epoch = self.grace_epoch;
        let grace = self.settings.stopped_grace;
        let id = self.id.clone();
        let events = self.events.clone();

        self.grace_timer = Some(tokio::spawn(async move {
            time::sleep(grace).await;
            let _ = events.send(MediaEvent::Player {
                id,
                event: PlayerEvent::GraceExpired(epoch),
            });
        }));
    }

    fn query_position(&self) {
        let link = Arc::clone(&self.link);
        let id = self.id.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let reply = time::timeout(POSITION_QUERY_TIMEOUT, link.query_position())
                .await
                .unwrap_or_else(|_| Err(MediaError::PlayerUnresponsive(id.clone())));

            match reply {
                Ok(position) => {
                    let _ = events.send(MediaEvent::Player {
                        id,
                        event: PlayerEvent::PositionQueried(position),
                    });
                }
                Err(e) => debug!(player = %id, "Position query failed: {e}"),
            }
        });
    }
}

impl Drop for PlayerHandle {
    fn drop(&mut self) {
        for task in [
            self.monitor.take(),
            self.ticker.take(),
            self.grace_timer.take(),
        ]
        .into_iter()
        .flatten()
        {
            task.abort();
        }
    }
}

impl std::fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("track", &self.track)
            .field("capabilities", &self.capabilities)
            .field("position", &self.clock.exposed())
            .field("grace_expired", &self.grace_expired)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{testing::*, *};

    #[tokio::test(start_paused = true)]
    async fn availability_predicate() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Playing, "", "Song"));
        assert!(player.is_available());

        player.refresh_info(info(PlaybackState::Idle, "", "Song"));
        assert!(!player.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_metadata_is_unavailable() {
        let (player, _link, _rx) = handle("vlc", info(PlaybackState::Playing, "  ", "\t"));

        assert!(!player.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_capabilities_are_unavailable() {
        let mut snapshot = info(PlaybackState::Playing, "Muse", "Starlight");
        snapshot.capabilities.can_control = false;
        let (player, _link, _rx) = handle("vlc", snapshot);

        assert!(!player.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_reports_changes() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Paused, "Muse", "A"));

        let changes = player.refresh_info(info(PlaybackState::Paused, "Muse", "A"));
        assert_eq!(changes, PlayerChanges::METADATA);

        let changes = player.refresh_info(info(PlaybackState::Playing, "Muse", "A"));
        assert!(changes.contains(PlayerChanges::STATE | PlayerChanges::PROPERTY));

        let changes = player.refresh_info(info(PlaybackState::Playing, "Muse", "B"));
        assert!(changes.contains(PlayerChanges::PROPERTY));
        assert!(!changes.contains(PlayerChanges::STATE));
        assert_eq!(player.title(), "B");
    }

    #[tokio::test(start_paused = true)]
    async fn absent_metadata_keeps_previous_track() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Paused, "Muse", "A"));
        let mut snapshot = info(PlaybackState::Paused, "", "");
        snapshot.metadata = None;

        let changes = player.refresh_info(snapshot);

        assert!(changes.is_empty());
        assert_eq!(player.artist(), "Muse");
    }

    #[tokio::test(start_paused = true)]
    async fn position_estimate_while_playing() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Paused, "Muse", "A"));
        player.on_seeked(10_000_000);

        player.refresh_info(info(PlaybackState::Playing, "Muse", "A"));
        time::advance(Duration::from_secs(2)).await;

        assert_eq!(player.tick(), PlayerChanges::POSITION);
        assert!((player.position() - 12_000_000).abs() <= 100_000);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_player_does_not_tick() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Paused, "Muse", "A"));
        player.on_seeked(5_000_000);
        time::advance(Duration::from_secs(2)).await;

        assert!(player.tick().is_empty());
        assert_eq!(player.position(), 5_000_000);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_posts_while_playing() {
        let (_player, _link, mut rx) = handle("vlc", info(PlaybackState::Playing, "Muse", "A"));

        let mut ticks = 0;
        while ticks < 2 {
            if let Some(MediaEvent::Player {
                event: PlayerEvent::PositionTick,
                ..
            }) = rx.recv().await
            {
                ticks += 1;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn position_query_reply_is_posted() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let link = Arc::new(FakeLink::default());
        *link.position.lock().unwrap() = Some(42_000_000);
        let opened = OpenedPlayer {
            info: info(PlaybackState::Paused, "Muse", "A"),
            link,
        };
        let id = PlayerId::from_bus_name("org.mpris.MediaPlayer2.vlc");
        let mut player = PlayerHandle::new(id, opened, tx, PlayerSettings::default());

        let position = loop {
            if let Some(MediaEvent::Player {
                event: PlayerEvent::PositionQueried(position),
                ..
            }) = rx.recv().await
            {
                break position;
            }
        };

        assert_eq!(player.on_position_reply(position), PlayerChanges::POSITION);
        assert_eq!(player.position(), 42_000_000);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_position_query_gives_no_update() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let link = Arc::new(FakeLink::default());
        *link.position.lock().unwrap() = Some(42_000_000);
        *link.stalled.lock().unwrap() = true;
        let opened = OpenedPlayer {
            info: info(PlaybackState::Paused, "Muse", "A"),
            link,
        };
        let id = PlayerId::from_bus_name("org.mpris.MediaPlayer2.vlc");
        let mut player = PlayerHandle::new(id, opened, tx, PlayerSettings::default());
        player.on_seeked(5_000_000);

        time::sleep(POSITION_QUERY_TIMEOUT + Duration::from_millis(500)).await;

        while let Ok(event) = rx.try_recv() {
            assert!(
                !matches!(
                    event,
                    MediaEvent::Player {
                        event: PlayerEvent::PositionQueried(_),
                        ..
                    }
                ),
                "unexpected position reply"
            );
        }
        assert_eq!(player.position(), 5_000_000);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_position_reply_is_absorbed() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Playing, "Muse", "A"));
        player.on_seeked(5_000_000);

        assert_eq!(player.on_position_reply(i64::MIN), PlayerChanges::POSITION);
        assert_eq!(player.on_position_reply(i64::MAX), PlayerChanges::POSITION);
        time::advance(Duration::from_secs(1)).await;

        assert!(player.tick().is_empty());
        assert_eq!(player.position(), i64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn grace_expiry_makes_stopped_player_unavailable() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Playing, "Muse", "A"));
        player.refresh_info(info(PlaybackState::Stopped, "Muse", "A"));
        assert!(player.is_available());

        let changes = player.expire_grace(player.grace_epoch);

        assert!(changes.contains(PlayerChanges::AVAILABILITY));
        assert!(!player.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_grace_timer_is_ignored() {
        let (mut player, _link, _rx) = handle("vlc", info(PlaybackState::Playing, "Muse", "A"));
        player.refresh_info(info(PlaybackState::Stopped, "Muse", "A"));
        let stale = player.grace_epoch;
        player.refresh_info(info(PlaybackState::Playing, "Muse", "A"));
        player.refresh_info(info(PlaybackState::Stopped, "Muse", "A"));

        assert!(player.expire_grace(stale).is_empty());
        assert!(player.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn commands_reach_the_link() {
        let (player, link, _rx) = handle("vlc", info(PlaybackState::Playing, "Muse", "A"));

        player.play_pause();
        player.next();
        tokio::task::yield_now().await;

        assert_eq!(
            *link.commands.lock().unwrap(),
            vec![PlayerCommand::PlayPause, PlayerCommand::Next]
        );
    }
}

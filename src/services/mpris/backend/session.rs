use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::{sync::OnceCell, task::JoinHandle};
use tracing::{debug, info, instrument};
use zbus::{Connection, fdo, proxy::CacheProperties};

use super::{OpenedPlayer, PlayerBackend, PlayerLink};
use crate::services::mpris::{
    EventSender, MediaError, MediaEvent, PlaybackState, PlayerCapabilities, PlayerCommand,
    PlayerId, metadata::TrackMetadata, player::PlayerInfo, player::monitoring::PlayerMonitor,
    proxy::MediaPlayer2PlayerProxy,
};

/// [`PlayerBackend`] on the D-Bus session bus.
///
/// The connection is opened on first use and shared afterwards.
#[derive(Default)]
pub struct SessionBus {
    connection: OnceCell<Connection>,
}

impl SessionBus {
    /// Create a backend that connects lazily.
    pub fn new() -> Self {
        Self::default()
    }

    async fn connection(&self) -> Result<&Connection, MediaError> {
        self.connection
            .get_or_try_init(|| async {
                info!("Connecting to the session bus");
                Connection::session().await.map_err(|e| {
                    MediaError::InitializationFailed(format!("session bus connection failed: {e}"))
                })
            })
            .await
    }
}

#[async_trait]
impl PlayerBackend for SessionBus {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerId>, MediaError> {
        let dbus_proxy = fdo::DBusProxy::new(self.connection().await?).await?;
        let names = dbus_proxy.list_names().await?;

        Ok(names
            .iter()
            .map(|name| name.as_str())
            .filter(|name| PlayerId::is_mpris_name(name))
            .map(PlayerId::from_bus_name)
            .collect())
    }

    #[instrument(skip(self, events))]
    async fn watch_players(&self, events: EventSender) -> Result<JoinHandle<()>, MediaError> {
        let dbus_proxy = fdo::DBusProxy::new(self.connection().await?).await?;
        let mut name_owner_changed = dbus_proxy.receive_name_owner_changed().await?;

        Ok(tokio::spawn(async move {
            while let Some(signal) = name_owner_changed.next().await {
                let Ok(args) = signal.args() else {
                    continue;
                };

                if !PlayerId::is_mpris_name(args.name().as_str()) {
                    continue;
                }

                let event = MediaEvent::NameOwnerChanged {
                    id: PlayerId::from_bus_name(args.name().as_str()),
                    appeared: args.new_owner().is_some(),
                };

                if events.send(event).is_err() {
                    break;
                }
            }

            debug!("Name owner watcher ended");
        }))
    }

    #[instrument(skip(self), fields(player = %id))]
    async fn open_player(&self, id: &PlayerId) -> Result<OpenedPlayer, MediaError> {
        let proxy = MediaPlayer2PlayerProxy::builder(self.connection().await?)
            .destination(id.bus_name().to_string())?
            .cache_properties(CacheProperties::Yes)
            .build()
            .await?;

        let info = PlayerInfo::from_cache(&proxy);
        debug!(state = %info.state, "Opened player");

        Ok(OpenedPlayer {
            info,
            link: Arc::new(BusPlayer { proxy }),
        })
    }
}

struct BusPlayer {
    proxy: MediaPlayer2PlayerProxy<'static>,
}

#[async_trait]
impl PlayerLink for BusPlayer {
    async fn send(&self, command: PlayerCommand) -> Result<(), MediaError> {
        let reply = match command {
            PlayerCommand::Play => self.proxy.play().await,
            PlayerCommand::Pause => self.proxy.pause().await,
            PlayerCommand::Stop => self.proxy.stop().await,
            PlayerCommand::PlayPause => self.proxy.play_pause().await,
            PlayerCommand::Next => self.proxy.next().await,
            PlayerCommand::Previous => self.proxy.previous().await,
        };

        reply.map_err(|e| MediaError::ControlFailed(format!("{command}: {e}")))
    }

    async fn query_position(&self) -> Result<i64, MediaError> {
        Ok(self.proxy.position().await?)
    }

    fn monitor(&self, id: PlayerId, events: EventSender) -> JoinHandle<()> {
        PlayerMonitor::start(id, self.proxy.clone(), events)
    }
}

impl PlayerInfo {
    /// Read a snapshot from the proxy's property cache without a bus round trip.
    pub(crate) fn from_cache(proxy: &MediaPlayer2PlayerProxy<'_>) -> Self {
        Self {
            state: proxy
                .cached_playback_status()
                .ok()
                .flatten()
                .map(|status| PlaybackState::from(status.as_str()))
                .unwrap_or_default(),
            metadata: proxy
                .cached_metadata()
                .ok()
                .flatten()
                .map(|metadata| TrackMetadata::from(&metadata)),
            capabilities: PlayerCapabilities {
                can_play: cached_flag(proxy.cached_can_play()),
                can_control: cached_flag(proxy.cached_can_control()),
                can_go_next: cached_flag(proxy.cached_can_go_next()),
                can_go_previous: cached_flag(proxy.cached_can_go_previous()),
            },
        }
    }
}

fn cached_flag<E>(value: Result<Option<bool>, E>) -> bool {
    value.ok().flatten().unwrap_or(false)
}

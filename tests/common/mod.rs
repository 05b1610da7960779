//! In-memory bus shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use mediabar::{
    config::MediaConfig,
    services::mpris::{
        EventSender, MediaError, MediaEvent, MediaService, OpenedPlayer, PlaybackState,
        PlayerBackend, PlayerCapabilities, PlayerCommand, PlayerEvent, PlayerId, PlayerInfo,
        PlayerLink, TrackMetadata,
    },
};
use tokio::{task::JoinHandle, time::sleep};

pub fn id(name: &str) -> PlayerId {
    PlayerId::from_bus_name(&format!("org.mpris.MediaPlayer2.{name}"))
}

pub fn info(state: PlaybackState, artist: &str, title: &str) -> PlayerInfo {
    PlayerInfo {
        state,
        metadata: Some(TrackMetadata {
            title: title.to_string(),
            artist: artist.to_string(),
            art_url: String::new(),
            length: 180_000_000,
        }),
        capabilities: PlayerCapabilities {
            can_play: true,
            can_control: true,
            can_go_next: true,
            can_go_previous: true,
        },
    }
}

#[derive(Default)]
pub struct FakeLink {
    pub commands: Mutex<Vec<PlayerCommand>>,
}

#[async_trait]
impl PlayerLink for FakeLink {
    async fn send(&self, command: PlayerCommand) -> Result<(), MediaError> {
        self.commands.lock().unwrap().push(command);
        Ok(())
    }

    async fn query_position(&self) -> Result<i64, MediaError> {
        Ok(0)
    }

    fn monitor(&self, _id: PlayerId, _events: EventSender) -> JoinHandle<()> {
        tokio::spawn(async {})
    }
}

/// Bus with scripted players. Tests drive it through the event sender the
/// service hands to `watch_players`.
#[derive(Default)]
pub struct FakeBus {
    present: Mutex<Vec<PlayerId>>,
    players: Mutex<HashMap<PlayerId, PlayerInfo>>,
    links: Mutex<HashMap<PlayerId, Arc<FakeLink>>>,
    events: Mutex<Option<EventSender>>,
}

impl FakeBus {
    pub fn with_players(players: &[(&str, PlayerInfo)]) -> Arc<Self> {
        let bus = Self::default();
        for (name, player) in players {
            bus.present.lock().unwrap().push(id(name));
            bus.players.lock().unwrap().insert(id(name), player.clone());
        }
        Arc::new(bus)
    }

    pub fn post(&self, event: MediaEvent) {
        let events = self.events.lock().unwrap();
        events.as_ref().unwrap().send(event).unwrap();
    }

    pub fn update(&self, name: &str, player: PlayerInfo) {
        self.players.lock().unwrap().insert(id(name), player.clone());
        self.post(MediaEvent::Player {
            id: id(name),
            event: PlayerEvent::Refreshed(player),
        });
    }

    pub fn appear(&self, name: &str, player: PlayerInfo) {
        self.players.lock().unwrap().insert(id(name), player);
        self.post(MediaEvent::NameOwnerChanged {
            id: id(name),
            appeared: true,
        });
    }

    pub fn vanish(&self, name: &str) {
        self.players.lock().unwrap().remove(&id(name));
        self.post(MediaEvent::NameOwnerChanged {
            id: id(name),
            appeared: false,
        });
    }

    pub fn commands(&self, name: &str) -> Vec<PlayerCommand> {
        let links = self.links.lock().unwrap();
        links
            .get(&id(name))
            .map(|link| link.commands.lock().unwrap().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PlayerBackend for FakeBus {
    async fn list_players(&self) -> Result<Vec<PlayerId>, MediaError> {
        Ok(self.present.lock().unwrap().clone())
    }

    async fn watch_players(&self, events: EventSender) -> Result<JoinHandle<()>, MediaError> {
        *self.events.lock().unwrap() = Some(events);
        Ok(tokio::spawn(async {}))
    }

    async fn open_player(&self, player: &PlayerId) -> Result<OpenedPlayer, MediaError> {
        let info = self
            .players
            .lock()
            .unwrap()
            .get(player)
            .cloned()
            .ok_or_else(|| MediaError::PlayerNotFound(player.clone()))?;
        let link = Arc::new(FakeLink::default());
        self.links
            .lock()
            .unwrap()
            .insert(player.clone(), Arc::clone(&link));

        Ok(OpenedPlayer { info, link })
    }
}

pub async fn start(bus: &Arc<FakeBus>, config: &MediaConfig) -> MediaService {
    let backend: Arc<dyn PlayerBackend> = bus.clone();
    MediaService::start_with_backend(config, backend)
        .await
        .unwrap()
}

/// Let the event loop drain everything queued so far.
pub async fn settle() {
    sleep(Duration::from_millis(20)).await;
}


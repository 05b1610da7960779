use std::{collections::HashSet, sync::Arc};

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{
    EventSender, MediaError, MediaEvent, PlayerId,
    backend::{OpenedPlayer, PlayerBackend},
    player::{PlayerHandle, PlayerSettings},
};

/// Receives the registry's two lifecycle notifications.
pub trait RegistryListener {
    /// A player was inserted into the store.
    fn player_added(&mut self, id: &PlayerId, players: &PlayerStore);

    /// A player is about to be removed; it is still in `players`.
    fn player_removed(&mut self, id: &PlayerId, players: &PlayerStore);
}

/// Player handles in discovery order, at most one per bus name.
#[derive(Debug, Default)]
pub struct PlayerStore {
    handles: Vec<PlayerHandle>,
}

impl PlayerStore {
    /// Look up a handle by identity.
    pub fn get(&self, id: &PlayerId) -> Option<&PlayerHandle> {
        self.handles.iter().find(|handle| handle.id() == id)
    }

    /// Look up a handle by identity for mutation.
    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerHandle> {
        self.handles.iter_mut().find(|handle| handle.id() == id)
    }

    /// Whether a handle for `id` exists.
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is tracked and currently available.
    pub fn is_available(&self, id: &PlayerId) -> bool {
        self.get(id).is_some_and(PlayerHandle::is_available)
    }

    /// Append a handle, returns `false` and drops it when the id is already present.
    pub fn insert(&mut self, handle: PlayerHandle) -> bool {
        if self.contains(handle.id()) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Unlink and return the handle for `id`.
    pub fn remove(&mut self, id: &PlayerId) -> Option<PlayerHandle> {
        let index = self.handles.iter().position(|handle| handle.id() == id)?;
        Some(self.handles.remove(index))
    }

    /// Iterate handles in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerHandle> {
        self.handles.iter()
    }

    /// Number of tracked handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether no handle is tracked.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Discovers and retires players.
///
/// Owns every [`PlayerHandle`]. Names that appear after startup are opened on
/// a background task and inserted when [`MediaEvent::PlayerOpened`] comes
/// back, so slow players never stall the event loop.
pub struct PlayerRegistry {
    backend: Arc<dyn PlayerBackend>,
    events: EventSender,
    settings: PlayerSettings,
    store: PlayerStore,
    pending: HashSet<PlayerId>,
    watcher: Option<JoinHandle<()>>,
}

impl PlayerRegistry {
    /// Create an empty registry.
    pub fn new(
        backend: Arc<dyn PlayerBackend>,
        events: EventSender,
        settings: PlayerSettings,
    ) -> Self {
        Self {
            backend,
            events,
            settings,
            store: PlayerStore::default(),
            pending: HashSet::new(),
            watcher: None,
        }
    }

    /// Tracked players.
    pub fn players(&self) -> &PlayerStore {
        &self.store
    }

    /// Tracked player for mutation.
    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerHandle> {
        self.store.get_mut(id)
    }

    /// Subscribe to ownership changes (once) and add every player already on the bus.
    ///
    /// # Errors
    /// Returns error if the bus connection, the subscription or the name
    /// listing fails. Players that fail to open are skipped, not reported.
    #[instrument(skip_all)]
    pub async fn start(&mut self, listener: &mut impl RegistryListener) -> Result<(), MediaError> {
        if self.watcher.is_none() {
            self.watcher = Some(self.backend.watch_players(self.events.clone()).await?);
        }

        let names = self.backend.list_players().await?;
        info!("Found {} MPRIS players on the bus", names.len());

        for id in names {
            if !PlayerId::is_mpris_name(id.bus_name()) || self.store.contains(&id) {
                continue;
            }

            match self.backend.open_player(&id).await {
                Ok(opened) => self.insert(id, opened, listener),
                Err(e) => warn!(player = %id, "Failed to open player: {e}"),
            }
        }

        Ok(())
    }

    /// React to a name gaining an owner.
    pub fn name_appeared(&mut self, id: PlayerId) {
        if !PlayerId::is_mpris_name(id.bus_name())
            || self.store.contains(&id)
            || self.pending.contains(&id)
        {
            return;
        }

        debug!(player = %id, "Opening player");
        self.pending.insert(id.clone());

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = backend.open_player(&id).await;
            let _ = events.send(MediaEvent::PlayerOpened { id, result });
        });
    }

    /// Insert a player whose connection finished opening.
    pub fn player_opened(
        &mut self,
        id: PlayerId,
        result: Result<OpenedPlayer, MediaError>,
        listener: &mut impl RegistryListener,
    ) {
        if !self.pending.remove(&id) {
            debug!(player = %id, "Player vanished before it finished opening");
            return;
        }

        match result {
            Ok(opened) => self.insert(id, opened, listener),
            Err(e) => warn!(player = %id, "Failed to open player: {e}"),
        }
    }

    /// React to a name losing its owner.
    ///
    /// The listener hears about the removal while the handle is still in the
    /// store, then the handle is unlinked and dropped.
    pub fn name_vanished(&mut self, id: &PlayerId, listener: &mut impl RegistryListener) {
        self.pending.remove(id);

        if !self.store.contains(id) {
            return;
        }

        info!(player = %id, "Player removed");
        listener.player_removed(id, &self.store);
        self.store.remove(id);
    }

    fn insert(&mut self, id: PlayerId, opened: OpenedPlayer, listener: &mut impl RegistryListener) {
        if self.store.contains(&id) {
            return;
        }

        let handle = PlayerHandle::new(id.clone(), opened, self.events.clone(), self.settings);
        if self.store.insert(handle) {
            info!(player = %id, "Player added");
            listener.player_added(&id, &self.store);
        }
    }
}

impl Drop for PlayerRegistry {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

//! Current-player selection over every tracked player.

mod display;
mod ignore;
mod marquee;
mod selection;

use bitflags::bitflags;
use tracing::{debug, info};

pub use display::{DisplayState, NO_MEDIA, NO_NAME, index_label, position_ratio, title_line};
pub use ignore::IgnoreList;
pub use marquee::Marquee;

use super::{
    PlaybackState, PlayerId,
    player::{PlayerChanges, PlayerHandle},
    registry::{PlayerStore, RegistryListener},
};
use crate::config::MediaConfig;

bitflags! {
    /// Hooks the display layer should hear about after an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Notifications: u8 {
        /// The current player changed
        const SELECTION_CHANGED = 1 << 0;
        /// Something visible changed
        const REFRESH = 1 << 1;
    }
}

/// Resolves the single current player and answers display queries.
///
/// Holds player ids only; handles stay in the registry's [`PlayerStore`],
/// which is passed into every call. Whenever some listed player is
/// available, `current` names an available one.
#[derive(Debug)]
pub struct Controller {
    players: Vec<PlayerId>,
    current: Option<PlayerId>,
    ignored: IgnoreList,
    marquee: Marquee,
    pending: Notifications,
}

impl Controller {
    /// Create a controller with no players.
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            players: Vec::new(),
            current: None,
            ignored: IgnoreList::parse(&config.ignored_players),
            marquee: Marquee::new(config),
            pending: Notifications::empty(),
        }
    }

    /// Listed players in discovery order.
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Current player, if any.
    pub fn current(&self) -> Option<&PlayerId> {
        self.current.as_ref()
    }

    /// Drain notifications raised since the last call.
    pub fn take_notifications(&mut self) -> Notifications {
        std::mem::take(&mut self.pending)
    }

    /// Re-evaluate selection after a player handled an event.
    pub fn on_player_changed(&mut self, id: &PlayerId, changes: PlayerChanges, store: &PlayerStore) {
        if changes.is_empty() || !self.players.contains(id) {
            return;
        }

        if changes.intersects(PlayerChanges::STATE | PlayerChanges::AVAILABILITY)
            && store
                .get(id)
                .is_some_and(|handle| handle.is_available() && handle.state() == PlaybackState::Playing)
        {
            self.set_current(Some(id.clone()));
        }

        self.repair(store);
        self.pending |= Notifications::REFRESH;
    }

    /// Cycle to the next available player after the current one.
    ///
    /// Keeps the current player when no other one is available.
    pub fn select_next_player(&mut self, store: &PlayerStore) {
        let next = selection::select_next(&self.players, self.current.as_ref(), |id| {
            store.is_available(id)
        })
        .cloned();

        match next {
            Some(next) => self.set_current(Some(next)),
            None => debug!("No other available player to select"),
        }

        self.repair(store);
    }

    /// Advance the marquee; returns `true` when the visible title moved.
    pub fn marquee_tick(&mut self, store: &PlayerStore) -> bool {
        let len = self.title_line(store).chars().count();
        let moved = self.marquee.tick(len);
        if moved {
            self.pending |= Notifications::REFRESH;
        }
        moved
    }

    /// Current marquee state.
    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    /// "Artist - Title" of the current player.
    pub fn title_line(&self, store: &PlayerStore) -> String {
        self.current_handle(store)
            .map_or_else(|| NO_MEDIA.to_string(), |handle| {
                title_line(handle.artist(), handle.title())
            })
    }

    /// Progress of the current player in `[0, 1]`.
    pub fn position_ratio(&self, store: &PlayerStore) -> Option<f64> {
        self.current_handle(store)
            .and_then(|handle| position_ratio(handle.state(), handle.position(), handle.length()))
    }

    /// `[pos/size]` of the current player among available players.
    pub fn player_index_label(&self, store: &PlayerStore) -> String {
        index_label(&self.players, self.current.as_ref(), |id| {
            store.is_available(id)
        })
    }

    /// Whether the current player can skip forward.
    pub fn can_go_next(&self, store: &PlayerStore) -> bool {
        self.current_handle(store)
            .is_some_and(|handle| handle.capabilities().can_go_next)
    }

    /// Whether the current player can skip back.
    pub fn can_go_previous(&self, store: &PlayerStore) -> bool {
        self.current_handle(store)
            .is_some_and(|handle| handle.capabilities().can_go_previous)
    }

    /// Playback state of the current player, `Idle` without one.
    pub fn playback_state(&self, store: &PlayerStore) -> PlaybackState {
        self.current_handle(store)
            .map_or(PlaybackState::Idle, PlayerHandle::state)
    }

    /// Artwork URL of the current player.
    pub fn art_url(&self, store: &PlayerStore) -> String {
        self.current_handle(store)
            .map(|handle| handle.art_url().to_string())
            .unwrap_or_default()
    }

    /// Snapshot of everything the widget shows.
    pub fn display(&self, store: &PlayerStore) -> DisplayState {
        let title = self.title_line(store);
        let handle = self.current_handle(store);

        DisplayState {
            player: self.current.clone(),
            visible_title: self.marquee.window(&title),
            title,
            index_label: self.player_index_label(store),
            state: self.playback_state(store),
            position_ratio: self.position_ratio(store),
            position: handle.map_or(0, PlayerHandle::position),
            length: handle.map_or(0, PlayerHandle::length),
            can_go_previous: self.can_go_previous(store),
            can_go_next: self.can_go_next(store),
            art_url: self.art_url(store),
        }
    }

    fn current_handle<'a>(&self, store: &'a PlayerStore) -> Option<&'a PlayerHandle> {
        self.current.as_ref().and_then(|id| store.get(id))
    }

    fn any_available(&self, store: &PlayerStore) -> bool {
        self.players.iter().any(|id| store.is_available(id))
    }

    fn current_available(&self, store: &PlayerStore) -> bool {
        self.current.as_ref().is_some_and(|id| store.is_available(id))
    }

    /// Restore the selection invariant when the current player is missing or unavailable.
    ///
    /// With nothing else available, an unavailable current player is only
    /// kept while it is playing.
    fn repair(&mut self, store: &PlayerStore) {
        if self.current_available(store) {
            return;
        }

        if self.any_available(store) {
            let next = selection::select_next(&self.players, self.current.as_ref(), |id| {
                store.is_available(id)
            })
            .cloned();
            self.set_current(next);
        } else if self.playback_state(store) != PlaybackState::Playing {
            self.set_current(None);
        }
    }

    fn set_current(&mut self, next: Option<PlayerId>) {
        if self.current == next {
            return;
        }

        info!(
            from = ?self.current.as_ref().map(PlayerId::short_name),
            to = ?next.as_ref().map(PlayerId::short_name),
            "Current player changed"
        );

        if next.is_some() {
            self.marquee.reset();
        }
        self.current = next;
        self.pending |= Notifications::SELECTION_CHANGED | Notifications::REFRESH;
    }
}

impl RegistryListener for Controller {
    fn player_added(&mut self, id: &PlayerId, players: &PlayerStore) {
        if self.ignored.matches(id) {
            debug!(player = %id, "Ignoring player");
            return;
        }

        if self.players.contains(id) {
            return;
        }
        self.players.push(id.clone());

        let Some(handle) = players.get(id) else {
            return;
        };

        let available = handle.is_available();
        let playing = handle.state() == PlaybackState::Playing;

        if (self.current.is_none() && available)
            || (playing && (available || !self.current_available(players)))
        {
            self.set_current(Some(id.clone()));
        }

        self.repair(players);
        self.pending |= Notifications::REFRESH;
    }

    fn player_removed(&mut self, id: &PlayerId, players: &PlayerStore) {
        let Some(index) = self.players.iter().position(|listed| listed == id) else {
            return;
        };

        if self.current.as_ref() == Some(id) {
            let next = selection::select_next(&self.players, Some(id), |candidate| {
                players.is_available(candidate)
            })
            .cloned();
            self.set_current(next);
        }

        self.players.remove(index);
        self.pending |= Notifications::REFRESH;
    }
}

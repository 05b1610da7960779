//! MPRIS player aggregation.
//!
//! Tracks every `org.mpris.MediaPlayer2.*` player on the session bus and
//! resolves a single current player for a status bar widget.

/// Bus seams: player discovery and per-player links
pub mod backend;
/// Current-player selection and display queries
pub mod controller;
/// Media player error types
pub mod error;
/// Event loop messages
pub mod events;
/// Track metadata types
pub mod metadata;
/// Per-player state tracking
pub mod player;
/// D-Bus proxy trait definitions
pub mod proxy;
/// Player discovery and lifecycle management
pub mod registry;
/// The media service and its event loop
pub mod service;
/// Player identity, state and command types
pub mod types;

pub use backend::{OpenedPlayer, PlayerBackend, PlayerLink, SessionBus};
pub use controller::{Controller, DisplayState, IgnoreList, Notifications};
pub use error::*;
pub use events::*;
pub use metadata::*;
pub use player::{PlayerChanges, PlayerHandle, PlayerInfo, PlayerSettings};
pub use registry::{PlayerRegistry, PlayerStore, RegistryListener};
pub use service::{MediaRemote, MediaService, PlayerSummary};
pub use types::*;

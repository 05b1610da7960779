//! Mediabar - MPRIS media module for waybar.
//!
//! Mediabar watches every MPRIS player on the session bus, keeps one of them
//! as the current player and renders it as a waybar `custom` module:
//!
//! - Player discovery through `NameOwnerChanged`
//! - Current-player selection with Playing preemption and round-robin
//! - Smooth position estimation between bus updates
//! - Marquee scrolling for long titles
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mediabar::{config::Config, services::MediaService};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_default()?;
//! let service = MediaService::start(&config.media).await?;
//!
//! println!("{:?}", service.display());
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and validation.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Waybar input and output formats.
pub mod cli;

/// Reactive services for system integration.
pub mod services;

/// Tracing subscriber setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{MediabarError, Result};

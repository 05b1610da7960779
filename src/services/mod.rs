/// Shared building blocks for services
pub mod common;
/// MPRIS media player aggregation service
pub mod mpris;

pub use mpris::{DisplayState, MediaService};

use crate::services::mpris::{PlaybackState, PlayerId};

/// Title shown when there is nothing to show.
pub const NO_MEDIA: &str = "No Media";

/// Title shown when the player reported artist or title made only of whitespace.
pub const NO_NAME: &str = "No Name";

/// Everything the display layer needs to render the widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayState {
    /// Current player, if any
    pub player: Option<PlayerId>,

    /// Full title line
    pub title: String,

    /// Part of the title line inside the marquee window
    pub visible_title: String,

    /// `[pos/size]` over available players
    pub index_label: String,

    /// Playback state of the current player
    pub state: PlaybackState,

    /// Progress through the track in `[0, 1]`, `None` when no bar is shown
    pub position_ratio: Option<f64>,

    /// Estimated position in microseconds
    pub position: i64,

    /// Track length in microseconds
    pub length: i64,

    /// Whether the previous-track control is shown
    pub can_go_previous: bool,

    /// Whether the next-track control is shown
    pub can_go_next: bool,

    /// Artwork URL, empty when unknown
    pub art_url: String,
}

/// Format the title line from artist and title.
pub fn title_line(artist: &str, title: &str) -> String {
    if artist.is_empty() && title.is_empty() {
        return NO_MEDIA.to_string();
    }

    match (artist.trim(), title.trim()) {
        ("", "") => NO_NAME.to_string(),
        (artist, "") => artist.to_string(),
        ("", title) => title.to_string(),
        (artist, title) => format!("{artist} - {title}"),
    }
}

/// `[pos/size]` where `size` counts available players and `pos` is the
/// 1-based rank of `current` among them, 0 when it is not available.
pub fn index_label(
    players: &[PlayerId],
    current: Option<&PlayerId>,
    is_available: impl Fn(&PlayerId) -> bool,
) -> String {
    let available: Vec<&PlayerId> = players.iter().filter(|id| is_available(id)).collect();
    let position = current
        .and_then(|current| available.iter().position(|id| *id == current))
        .map_or(0, |index| index + 1);

    format!("[{position}/{}]", available.len())
}

/// Position over length, clamped to `[0, 1]`.
///
/// Only defined while playing or paused with a known length.
pub fn position_ratio(state: PlaybackState, position: i64, length: i64) -> Option<f64> {
    if length <= 0 || !matches!(state, PlaybackState::Playing | PlaybackState::Paused) {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = position as f64 / length as f64;
    Some(ratio.clamp(0.0, 1.0))
}

use std::time::Duration;

use crate::config::MediaConfig;

/// Scrolling window over a title that is wider than the widget.
///
/// Widths and offsets count characters. After a reset the window holds at
/// the start for a number of ticks, then moves `step` characters per tick to
/// the end, bounces back to the start and waits again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marquee {
    enabled: bool,
    width: usize,
    step: usize,
    hold_ticks: u64,
    countdown: u64,
    offset: usize,
    forward: bool,
}

impl Marquee {
    /// Build from the media configuration.
    pub fn new(config: &MediaConfig) -> Self {
        let interval = config.scroll_interval_ms.max(1);
        // Whole ticks per second first, so 300 ms ticks hold 15 ticks over 5 s.
        let hold_ticks = config.scroll_before_timeout_s.saturating_mul(1000 / interval);

        Self {
            enabled: config.scroll_title,
            width: config.title_max_width.max(1),
            step: config.scroll_step.max(1),
            hold_ticks,
            countdown: hold_ticks,
            offset: 0,
            forward: true,
        }
    }

    /// Tick period, `None` when scrolling is disabled.
    pub fn interval(config: &MediaConfig) -> Option<Duration> {
        config
            .scroll_title
            .then(|| Duration::from_millis(config.scroll_interval_ms.max(1)))
    }

    /// Current offset in characters.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Back to the start, holding for the full pre-scroll delay.
    pub fn reset(&mut self) {
        self.countdown = self.hold_ticks;
        self.offset = 0;
        self.forward = true;
    }

    /// Advance one tick for a title of `len` characters.
    ///
    /// Returns `true` when the visible window moved.
    pub fn tick(&mut self, len: usize) -> bool {
        if !self.enabled || len <= self.width {
            let moved = self.offset != 0;
            self.reset();
            return moved;
        }

        if self.countdown > 0 {
            self.countdown -= 1;
            return false;
        }

        let end = len - self.width;
        if self.forward {
            self.offset = (self.offset + self.step).min(end);
            if self.offset == end {
                self.forward = false;
            }
        } else {
            self.offset = self.offset.saturating_sub(self.step);
            if self.offset == 0 {
                self.forward = true;
                self.countdown = self.hold_ticks;
            }
        }

        true
    }

    /// The part of `text` currently visible.
    ///
    /// With scrolling disabled, overlong text is cut and ends with an ellipsis.
    pub fn window(&self, text: &str) -> String {
        let len = text.chars().count();
        if len <= self.width {
            return text.to_string();
        }

        if !self.enabled {
            let mut cut: String = text.chars().take(self.width.saturating_sub(1)).collect();
            cut.push('…');
            return cut;
        }

        text.chars().skip(self.offset).take(self.width).collect()
    }
}

use tokio::time::Instant;

/// Estimates that drift further than this from a reported position get corrected (µs).
pub(crate) const DRIFT_THRESHOLD_US: i64 = 100_000;

/// Local estimate of a player's playback position.
///
/// Querying the real position is a bus round trip, so between replies the
/// position is extrapolated from the last known value and the time elapsed
/// since the clock was last reset. `exposed` is the value shown to the
/// display and only moves when the estimate drifts past the threshold.
#[derive(Debug, Clone)]
pub(crate) struct PositionClock {
    last_known: i64,
    exposed: i64,
    started: Option<Instant>,
}

impl PositionClock {
    pub fn new(position: i64) -> Self {
        Self {
            last_known: position,
            exposed: position,
            started: None,
        }
    }

    /// Position shown to the display (µs).
    pub fn exposed(&self) -> i64 {
        self.exposed
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Extrapolated position at `now` (µs).
    pub fn estimate(&self, now: Instant) -> i64 {
        match self.started {
            Some(started) => {
                let elapsed = now.saturating_duration_since(started).as_micros();
                self.last_known
                    .saturating_add(i64::try_from(elapsed).unwrap_or(i64::MAX))
            }
            None => self.last_known,
        }
    }

    /// Start extrapolating from the current position.
    pub fn start(&mut self, now: Instant) {
        self.last_known = self.estimate(now);
        self.started = Some(now);
    }

    /// Freeze the estimate and stop extrapolating.
    pub fn stop(&mut self, now: Instant) {
        self.last_known = self.estimate(now);
        self.exposed = self.last_known;
        self.started = None;
    }

    /// Take an authoritative position without any threshold check.
    pub fn seek(&mut self, position: i64, now: Instant) {
        self.last_known = position;
        self.exposed = position;
        if self.started.is_some() {
            self.started = Some(now);
        }
    }

    /// Apply a queried position, returns `true` when the estimate was corrected.
    pub fn correct(&mut self, position: i64, now: Instant) -> bool {
        if position.abs_diff(self.estimate(now)) <= DRIFT_THRESHOLD_US.unsigned_abs() {
            return false;
        }

        self.seek(position, now);
        true
    }

    /// Re-estimate, returns `true` when the exposed position moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let estimate = self.estimate(now);
        if estimate.abs_diff(self.exposed) <= DRIFT_THRESHOLD_US.unsigned_abs() {
            return false;
        }

        self.exposed = estimate;
        true
    }
}

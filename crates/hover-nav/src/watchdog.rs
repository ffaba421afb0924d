use std::time::{Duration, Instant};

/// Command-link watchdog.
///
/// Loss of the command link (vehicle out of range, operator app crash) must
/// force a landing rather than leave the vehicle flying autonomously forever.
/// The watchdog only ever resets on an explicit kick; there is no auto-reset.
#[derive(Debug)]
pub struct SafetyWatchdog {
    last_kick: Instant,
    timeout: Duration,
}

impl SafetyWatchdog {
    pub fn new(timeout: Duration, now: Instant) -> Self {
        Self { last_kick: now, timeout }
    }

    /// Record an accepted command. Older timestamps are ignored so the kick
    /// time is monotonically non-decreasing.
    pub fn kick(&mut self, now: Instant) {
        if now > self.last_kick {
            self.last_kick = now;
        }
    }

    pub fn since_kick(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_kick)
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.since_kick(now) > self.timeout
    }
}

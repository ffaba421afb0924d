use std::time::{Duration, Instant};

/// Forward-range classifier.
///
/// A valid sample below the threshold means the path ahead is blocked. There
/// is no hysteresis band: a reading oscillating around the threshold will
/// chatter between blocked and clear, which the supervisor tolerates.
///
/// Invalid samples read as clear by default so a dead sensor cannot freeze
/// the vehicle in a hold forever; `assume_blocked_on_invalid` flips that for
/// vehicles flown in tighter spaces.
#[derive(Debug)]
pub struct ObstacleMonitor {
    threshold_mm: u16,
    assume_blocked_on_invalid: bool,
    blocked: bool,
    blocked_since: Option<Instant>,
}

impl ObstacleMonitor {
    pub fn new(threshold_mm: u16, assume_blocked_on_invalid: bool) -> Self {
        Self {
            threshold_mm,
            assume_blocked_on_invalid,
            blocked: false,
            blocked_since: None,
        }
    }

    /// Classify the latest forward sample (`None` = no valid reading) and
    /// record the instant the path first became blocked.
    pub fn update(&mut self, sample_mm: Option<u16>, now: Instant) -> bool {
        let blocked = match sample_mm {
            Some(mm) => mm < self.threshold_mm,
            None => self.assume_blocked_on_invalid,
        };
        if blocked && !self.blocked {
            self.blocked_since = Some(now);
        } else if !blocked {
            self.blocked_since = None;
        }
        self.blocked = blocked;
        blocked
    }

    pub fn blocked(&self) -> bool {
        self.blocked
    }

    /// How long the path has been continuously blocked. Zero while clear.
    pub fn blocked_for(&self, now: Instant) -> Duration {
        self.blocked_since
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO)
    }

    pub fn clear(&mut self) {
        self.blocked = false;
        self.blocked_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_against_threshold() {
        let t = Instant::now();
        let mut mon = ObstacleMonitor::new(800, false);
        assert!(mon.update(Some(500), t));
        assert!(!mon.update(Some(2000), t));
        // exactly at the threshold reads as clear
        assert!(!mon.update(Some(800), t));
        assert!(mon.update(Some(799), t));
    }

    #[test]
    fn invalid_sample_reads_clear_by_default() {
        let t = Instant::now();
        let mut mon = ObstacleMonitor::new(800, false);
        mon.update(Some(500), t);
        assert!(!mon.update(None, t));
    }

    #[test]
    fn invalid_sample_can_read_blocked() {
        let t = Instant::now();
        let mut mon = ObstacleMonitor::new(800, true);
        assert!(mon.update(None, t));
    }

    #[test]
    fn tracks_continuous_blockage() {
        let t0 = Instant::now();
        let mut mon = ObstacleMonitor::new(800, false);
        mon.update(Some(500), t0);
        mon.update(Some(600), t0 + Duration::from_secs(10));
        assert_eq!(
            mon.blocked_for(t0 + Duration::from_secs(12)),
            Duration::from_secs(12)
        );
        // a clear reading resets the entry time
        mon.update(Some(1500), t0 + Duration::from_secs(13));
        assert_eq!(mon.blocked_for(t0 + Duration::from_secs(14)), Duration::ZERO);
        mon.update(Some(500), t0 + Duration::from_secs(15));
        assert_eq!(
            mon.blocked_for(t0 + Duration::from_secs(16)),
            Duration::from_secs(1)
        );
    }
}

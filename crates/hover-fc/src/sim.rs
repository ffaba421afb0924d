use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::info;

use crate::sensors::{RangeSensors, Stabilizer};
use hover_nav::Setpoint;

/// Simulated sensor profile for `run` without hardware attached.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorSimConfig {
    pub down_mm: u16,
    pub forward_mm: u16,
    /// Peak-to-peak jitter applied to the downward reading.
    pub noise_mm: u16,
}

impl Default for SensorSimConfig {
    fn default() -> Self {
        Self { down_mm: 1200, forward_mm: 2000, noise_mm: 10 }
    }
}

/// One step of a scripted sensor timeline: the readings that hold from
/// `after` onward (until the next phase begins).
#[derive(Debug, Clone, Copy)]
pub struct SensorPhase {
    pub after: Duration,
    pub down_mm: Option<u16>,
    pub forward_mm: Option<u16>,
}

/// Piecewise sensor timeline for bench and simulation runs.
#[derive(Debug)]
pub struct ScriptedSensors {
    started: Instant,
    phases: Vec<SensorPhase>,
    noise_mm: u16,
    rng: StdRng,
}

impl ScriptedSensors {
    /// Phases must be ordered by `after`; the first phase should start at
    /// zero or the sensors report invalid until it begins.
    pub fn new(phases: Vec<SensorPhase>, noise_mm: u16, now: Instant) -> Self {
        Self { started: now, phases, noise_mm, rng: StdRng::from_entropy() }
    }

    /// Constant readings, the profile used by `run` when no script is given.
    pub fn constant(cfg: &SensorSimConfig, now: Instant) -> Self {
        Self::new(
            vec![SensorPhase {
                after: Duration::ZERO,
                down_mm: Some(cfg.down_mm),
                forward_mm: Some(cfg.forward_mm),
            }],
            cfg.noise_mm,
            now,
        )
    }

    fn current(&self) -> Option<&SensorPhase> {
        let elapsed = self.started.elapsed();
        self.phases.iter().rev().find(|p| p.after <= elapsed)
    }

    fn jitter(&mut self, mm: u16) -> u16 {
        if self.noise_mm == 0 {
            return mm;
        }
        let half = i32::from(self.noise_mm) / 2;
        let wobble = self.rng.gen_range(-half..=half);
        (i32::from(mm) + wobble).clamp(0, i32::from(u16::MAX)) as u16
    }
}

impl RangeSensors for ScriptedSensors {
    fn downward_mm(&mut self) -> Option<u16> {
        let mm = self.current().and_then(|p| p.down_mm)?;
        Some(self.jitter(mm))
    }

    fn forward_mm(&mut self) -> Option<u16> {
        self.current().and_then(|p| p.forward_mm)
    }
}

/// Stabilizer stand-in that reports the applied setpoint once a second.
#[derive(Debug, Default)]
pub struct LogStabilizer {
    last_report: Option<Instant>,
}

impl Stabilizer for LogStabilizer {
    fn apply(&mut self, sp: &Setpoint) {
        let due = self
            .last_report
            .map_or(true, |t| t.elapsed() >= Duration::from_secs(1));
        if due {
            info!(
                vx = sp.vx,
                vy = sp.vy,
                thrust = sp.thrust,
                land = sp.land,
                "setpoint"
            );
            self.last_report = Some(Instant::now());
        }
    }
}

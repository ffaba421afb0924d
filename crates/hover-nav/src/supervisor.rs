use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::altitude::{AltitudeConfig, AltitudeController};
use crate::obstacle::ObstacleMonitor;
use crate::trajectory::{Shape, TrajectoryGenerator};
use crate::watchdog::SafetyWatchdog;

/// Assumed tick period until a second tick gives us a measured one.
const NOMINAL_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NavState {
    Idle = 0,
    Running = 1,
    HoldObstacle = 2,
    Landing = 3,
    Landed = 4,
    Override = 5,
}

impl NavState {
    /// One-byte encoding used in status replies.
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Per-tick motion command handed to the stabilizer. Produced fresh each
/// tick and consumed immediately; `land` signals the descent intent while
/// the vehicle is landing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setpoint {
    pub vx: f32,
    pub vy: f32,
    pub thrust: u16,
    pub land: bool,
}

impl Setpoint {
    pub const ZERO: Setpoint = Setpoint { vx: 0.0, vy: 0.0, thrust: 0, land: false };
    const LAND: Setpoint = Setpoint { vx: 0.0, vy: 0.0, thrust: 0, land: true };
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Nominal tick rate for the run loop. The supervisor itself is correct
    /// under any positive, jittery inter-tick interval.
    pub tick_hz: u32,
    /// Command-link silence that forces a landing.
    pub safety_timeout_s: u64,
    /// Forward range below which the path ahead counts as blocked.
    pub obstacle_threshold_mm: u16,
    /// Continuous blockage that escalates a hold into a landing.
    pub obstacle_hold_timeout_s: u64,
    /// Treat an invalid forward sample as blocked instead of clear.
    pub assume_blocked_on_invalid: bool,
    pub cruise_speed_mps: f32,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            tick_hz: 100,
            safety_timeout_s: 30,
            obstacle_threshold_mm: 800,
            obstacle_hold_timeout_s: 30,
            assume_blocked_on_invalid: false,
            cruise_speed_mps: 0.5,
        }
    }
}

/// The navigation state machine. Owns the watchdog, obstacle monitor,
/// altitude controller and trajectory generator, and is the only writer of
/// `NavState`.
///
/// Two activities call in concurrently: the periodic tick task and the
/// command path. Both go through one lock around the whole supervisor, so
/// every mutation lands atomically with respect to a tick (a new shape is
/// never observed against a stale shape clock).
#[derive(Debug)]
pub struct Supervisor {
    state: NavState,
    shape: Shape,
    shape_started: Instant,
    last_tick: Option<Instant>,
    last_down_mm: Option<u16>,
    watchdog: SafetyWatchdog,
    obstacle: ObstacleMonitor,
    obstacle_hold_timeout: Duration,
    altitude: AltitudeController,
    trajectory: TrajectoryGenerator,
}

impl Supervisor {
    pub fn new(cfg: &NavConfig, altitude: AltitudeConfig, now: Instant) -> Self {
        Self {
            state: NavState::Idle,
            shape: Shape::Stop,
            shape_started: now,
            last_tick: None,
            last_down_mm: None,
            watchdog: SafetyWatchdog::new(Duration::from_secs(cfg.safety_timeout_s), now),
            obstacle: ObstacleMonitor::new(
                cfg.obstacle_threshold_mm,
                cfg.assume_blocked_on_invalid,
            ),
            obstacle_hold_timeout: Duration::from_secs(cfg.obstacle_hold_timeout_s),
            altitude: AltitudeController::new(altitude),
            trajectory: TrajectoryGenerator::new(cfg.cruise_speed_mps),
        }
    }

    /// Back to the initial state: `Idle`, no shape, watchdog kicked to `now`,
    /// obstacle cleared, controller zeroed.
    pub fn reset(&mut self, now: Instant) {
        self.state = NavState::Idle;
        self.shape = Shape::Stop;
        self.shape_started = now;
        self.last_tick = None;
        self.last_down_mm = None;
        self.watchdog.kick(now);
        self.obstacle.clear();
        self.altitude.reset();
        info!("supervisor reset");
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Latest valid downward-range sample, for status telemetry.
    pub fn last_downward_mm(&self) -> Option<u16> {
        self.last_down_mm
    }

    /// Select a new shape. Kicks the watchdog and restarts the shape clock.
    /// Outside of override this also (re)starts the state machine: `Running`
    /// for a real shape, `Idle` for `Stop`.
    pub fn request_shape(&mut self, shape: Shape, now: Instant) {
        self.shape = shape;
        self.shape_started = now;
        self.watchdog.kick(now);
        self.obstacle.clear();
        if self.state == NavState::Override {
            info!(?shape, "shape selected during override, takes effect on release");
            return;
        }
        self.state = if shape == Shape::Stop { NavState::Idle } else { NavState::Running };
        info!(?shape, state = ?self.state, "shape selected");
    }

    /// Record that a command was accepted. Every accepted command kicks, not
    /// only shape changes — heartbeats and override toggles count too.
    pub fn kick_safety(&mut self, now: Instant) {
        self.watchdog.kick(now);
    }

    /// Update the altitude target without touching the state machine.
    pub fn set_target_altitude_mm(&mut self, mm: u16) {
        self.altitude.set_target_mm(mm);
        info!(target_mm = mm, "altitude target updated");
    }

    pub fn target_altitude_mm(&self) -> u16 {
        self.altitude.target_mm()
    }

    /// Manual override preempts all autonomous logic from any state,
    /// including `Landed`. Releasing it resumes `Running` when a shape is
    /// selected, `Idle` otherwise; the shape clock restarts so the pattern
    /// begins cleanly from wherever the pilot left the vehicle.
    pub fn enable_override(&mut self, on: bool, now: Instant) {
        self.watchdog.kick(now);
        if on {
            if self.state != NavState::Override {
                warn!(from = ?self.state, "manual override engaged");
                self.state = NavState::Override;
            }
        } else if self.state == NavState::Override {
            self.state = if self.shape == Shape::Stop { NavState::Idle } else { NavState::Running };
            self.shape_started = now;
            self.obstacle.clear();
            info!(state = ?self.state, "manual override released");
        }
    }

    /// One supervisor step: sample, transition, emit. Range samples are in
    /// millimetres, `None` when the sensor has no valid reading.
    pub fn tick(
        &mut self,
        now: Instant,
        down_mm: Option<u16>,
        forward_mm: Option<u16>,
    ) -> Setpoint {
        let dt = self
            .last_tick
            .map(|t| now.saturating_duration_since(t))
            .filter(|d| !d.is_zero())
            .unwrap_or(NOMINAL_TICK);
        self.last_tick = Some(now);
        if down_mm.is_some() {
            self.last_down_mm = down_mm;
        }

        // Landing is a single transitional tick: its zero-thrust setpoint
        // went out when the state was entered, so a tick that starts here
        // means the vehicle is down.
        if self.state == NavState::Landing {
            self.state = NavState::Landed;
            info!("landing complete");
            return Setpoint::ZERO;
        }

        // Safety first, before any other logic: a silent command link forces
        // a landing from every state except on the ground.
        if self.state != NavState::Landed && self.watchdog.expired(now) {
            warn!(
                silent_s = self.watchdog.since_kick(now).as_secs(),
                "command link silent past safety timeout, landing"
            );
            self.shape = Shape::Stop;
            self.state = NavState::Landing;
            return Setpoint::LAND;
        }

        // Override short-circuits autonomy entirely; only the watchdog is
        // serviced so handing control back later does not trip the timeout.
        if self.state == NavState::Override {
            self.watchdog.kick(now);
            return Setpoint::ZERO;
        }

        match self.state {
            NavState::Idle | NavState::Landed => Setpoint::ZERO,
            NavState::Running | NavState::HoldObstacle => {
                let blocked = self.obstacle.update(forward_mm, now);
                if blocked {
                    if self.state == NavState::Running {
                        warn!("obstacle ahead, holding position");
                        self.state = NavState::HoldObstacle;
                    }
                    if self.obstacle.blocked_for(now) > self.obstacle_hold_timeout {
                        warn!(
                            held_s = self.obstacle.blocked_for(now).as_secs(),
                            "obstacle persisted past hold timeout, landing"
                        );
                        self.shape = Shape::Stop;
                        self.state = NavState::Landing;
                        return Setpoint::LAND;
                    }
                } else if self.state == NavState::HoldObstacle {
                    info!("obstacle cleared, resuming");
                    self.state = NavState::Running;
                }

                let thrust = self.altitude.compute_thrust(down_mm, dt);
                let (vx, vy) = if self.state == NavState::Running {
                    self.trajectory
                        .velocity_for(self.shape, now.saturating_duration_since(self.shape_started))
                } else {
                    (0.0, 0.0)
                };
                Setpoint { vx, vy, thrust, land: false }
            }
            // both handled by the early returns above
            NavState::Landing | NavState::Override => Setpoint::ZERO,
        }
    }
}

use anyhow::Result;

use crate::altitude::AltitudeConfig;
use crate::supervisor::NavConfig;

pub fn check_nav(cfg: &NavConfig) -> Result<()> {
    anyhow::ensure!(
        (10..=1000).contains(&cfg.tick_hz),
        "nav.tick_hz should be 10..1000"
    );
    anyhow::ensure!(cfg.safety_timeout_s >= 5, "nav.safety_timeout_s too short");
    anyhow::ensure!(
        cfg.obstacle_threshold_mm >= 200,
        "nav.obstacle_threshold_mm leaves no room to stop"
    );
    anyhow::ensure!(
        cfg.obstacle_hold_timeout_s >= 1,
        "nav.obstacle_hold_timeout_s too short"
    );
    anyhow::ensure!(
        cfg.cruise_speed_mps > 0.0 && cfg.cruise_speed_mps <= 2.0,
        "nav.cruise_speed_mps out of range"
    );
    if !cfg.assume_blocked_on_invalid {
        tracing::warn!(
            "obstacle policy: invalid forward samples read as clear; \
             set nav.assume_blocked_on_invalid=true for the conservative posture"
        );
    }
    Ok(())
}

pub fn check_altitude(cfg: &AltitudeConfig) -> Result<()> {
    anyhow::ensure!(
        (100..=3000).contains(&cfg.target_mm),
        "altitude.target_mm should be 100..3000"
    );
    anyhow::ensure!(
        cfg.min_thrust < cfg.hover_thrust && cfg.hover_thrust < cfg.max_thrust,
        "altitude thrust band must satisfy min < hover < max"
    );
    anyhow::ensure!(cfg.kp > 0.0, "altitude.kp must be positive");
    anyhow::ensure!(cfg.ki >= 0.0 && cfg.kd >= 0.0, "altitude gains must be non-negative");
    Ok(())
}

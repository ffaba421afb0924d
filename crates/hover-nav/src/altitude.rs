use serde::Deserialize;
use std::time::Duration;

/// Fraction of the raw sample blended into the filtered altitude each update.
const FILTER_ALPHA: f32 = 0.1;
/// Anti-windup clamp on the accumulated integral term (mm·s).
const INTEGRAL_LIMIT: f32 = 400.0;
/// Fraction of hover thrust commanded while the downward sensor is invalid:
/// don't climb blindly, don't fall.
const INVALID_SAMPLE_FACTOR: f32 = 0.93;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AltitudeConfig {
    /// Default altitude target (mm) until the operator sets one.
    pub target_mm: u16,
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Thrust that holds altitude at zero error, in stabilizer units.
    pub hover_thrust: u16,
    pub min_thrust: u16,
    pub max_thrust: u16,
}

impl Default for AltitudeConfig {
    fn default() -> Self {
        Self {
            target_mm: 1200,
            kp: 24.0,
            ki: 8.0,
            kd: 6.0,
            hover_thrust: 32000,
            min_thrust: 20000,
            max_thrust: 65000,
        }
    }
}

/// Closed-loop thrust from a filtered downward-range estimate.
///
/// The raw sample is low-pass filtered (90 % retained per update), then a PID
/// around `target - filtered` biases the hover thrust. The integral term is
/// clamped and is left untouched while samples are invalid.
#[derive(Debug)]
pub struct AltitudeController {
    cfg: AltitudeConfig,
    target_mm: f32,
    filtered_mm: Option<f32>,
    integral: f32,
    prev_error: Option<f32>,
}

impl AltitudeController {
    pub fn new(cfg: AltitudeConfig) -> Self {
        let target_mm = f32::from(cfg.target_mm);
        Self {
            cfg,
            target_mm,
            filtered_mm: None,
            integral: 0.0,
            prev_error: None,
        }
    }

    pub fn set_target_mm(&mut self, mm: u16) {
        self.target_mm = f32::from(mm);
    }

    pub fn target_mm(&self) -> u16 {
        self.target_mm as u16
    }

    /// Drop the filter seed and accumulated terms; the target is kept.
    pub fn reset(&mut self) {
        self.filtered_mm = None;
        self.integral = 0.0;
        self.prev_error = None;
    }

    /// One control step. `dt` is the measured elapsed time since the previous
    /// call, not an assumed constant, so the loop stays correct under
    /// scheduling jitter.
    pub fn compute_thrust(&mut self, sample_mm: Option<u16>, dt: Duration) -> u16 {
        let Some(raw) = sample_mm else {
            return (f32::from(self.cfg.hover_thrust) * INVALID_SAMPLE_FACTOR) as u16;
        };
        let dt_s = dt.as_secs_f32().max(1e-4);

        let filtered = match self.filtered_mm {
            Some(prev) => (1.0 - FILTER_ALPHA) * prev + FILTER_ALPHA * f32::from(raw),
            None => f32::from(raw),
        };
        self.filtered_mm = Some(filtered);

        let error = self.target_mm - filtered;
        self.integral = (self.integral + error * dt_s).clamp(-INTEGRAL_LIMIT, INTEGRAL_LIMIT);
        let derivative = match self.prev_error {
            Some(prev) => (error - prev) / dt_s,
            None => 0.0,
        };
        self.prev_error = Some(error);

        let thrust = f32::from(self.cfg.hover_thrust)
            + self.cfg.kp * error
            + self.cfg.ki * self.integral
            + self.cfg.kd * derivative;
        thrust.clamp(
            f32::from(self.cfg.min_thrust),
            f32::from(self.cfg.max_thrust),
        ) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(10);

    #[test]
    fn converges_to_hover_thrust_at_target() {
        let cfg = AltitudeConfig::default();
        let hover = cfg.hover_thrust;
        let mut ctl = AltitudeController::new(cfg);
        let mut thrust = 0;
        for _ in 0..100 {
            thrust = ctl.compute_thrust(Some(1200), DT);
        }
        assert_eq!(thrust, hover);
    }

    #[test]
    fn invalid_sample_commands_reduced_hover() {
        let mut ctl = AltitudeController::new(AltitudeConfig::default());
        let thrust = ctl.compute_thrust(None, DT);
        assert_eq!(thrust, (32000.0 * 0.93) as u16);
    }

    #[test]
    fn invalid_sample_leaves_integral_untouched() {
        let mut ctl = AltitudeController::new(AltitudeConfig::default());
        // build up some integral while below target
        for _ in 0..50 {
            ctl.compute_thrust(Some(1000), DT);
        }
        let integral = ctl.integral;
        assert!(integral > 0.0);
        ctl.compute_thrust(None, DT);
        assert_eq!(ctl.integral, integral);
    }

    #[test]
    fn output_stays_inside_thrust_band() {
        let mut ctl = AltitudeController::new(AltitudeConfig::default());
        // way below target: thrust saturates high
        let high = ctl.compute_thrust(Some(0), DT);
        assert!(high <= 65000);
        ctl.reset();
        // way above target: thrust saturates low
        ctl.compute_thrust(Some(3000), DT);
        let low = ctl.compute_thrust(Some(3000), DT);
        assert!(low >= 20000);
    }

    #[test]
    fn step_target_raises_thrust_within_band() {
        let mut ctl = AltitudeController::new(AltitudeConfig::default());
        for _ in 0..10 {
            ctl.compute_thrust(Some(1200), DT);
        }
        ctl.set_target_mm(1500);
        let after_step = ctl.compute_thrust(Some(1200), DT);
        assert!(after_step > 32000);
        assert!(after_step <= 65000);
    }

    #[test]
    fn integral_is_clamped() {
        let mut ctl = AltitudeController::new(AltitudeConfig::default());
        for _ in 0..100_000 {
            ctl.compute_thrust(Some(0), DT);
        }
        assert!(ctl.integral <= 400.0);
        assert!(ctl.integral >= -400.0);
    }
}

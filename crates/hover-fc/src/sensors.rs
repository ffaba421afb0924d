use hover_nav::Setpoint;

/// Range sensors polled once per tick. `None` means the driver has no valid
/// reading right now; callers degrade rather than wait.
pub trait RangeSensors {
    fn downward_mm(&mut self) -> Option<u16>;
    fn forward_mm(&mut self) -> Option<u16>;
}

/// Consumer of the per-tick motion command. Applied immediately, no
/// acknowledgment.
pub trait Stabilizer {
    fn apply(&mut self, setpoint: &Setpoint);
}

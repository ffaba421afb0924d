use std::f32::consts::PI;
use std::time::Duration;

/// Requested horizontal flight pattern. `Stop` never coexists with a running
/// state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Stop,
    Square,
    Rectangle,
    Oval,
    Triangle,
    Pentagon,
}

/// Fixed length of one polygon segment.
pub const SEGMENT_DURATION: Duration = Duration::from_secs(3);

/// Lateral velocity component used for the triangle's 120° turns
/// (sin 60° rounded the way the flight geometry was tuned).
const TRIANGLE_LATERAL: f32 = 0.87;

/// Maps time-in-shape to a horizontal velocity vector.
///
/// Polygon shapes are flown as a cyclic sequence of constant-velocity
/// segments with abrupt switching at segment boundaries; the oval is a
/// continuous elliptical profile. Blending between segments is intentionally
/// absent.
#[derive(Debug)]
pub struct TrajectoryGenerator {
    speed_mps: f32,
}

impl TrajectoryGenerator {
    pub fn new(speed_mps: f32) -> Self {
        Self { speed_mps }
    }

    pub fn velocity_for(&self, shape: Shape, elapsed: Duration) -> (f32, f32) {
        let s = self.speed_mps;
        match shape {
            Shape::Stop => (0.0, 0.0),
            Shape::Square => match segment_index(elapsed, 4) {
                0 => (s, 0.0),
                1 => (0.0, s),
                2 => (-s, 0.0),
                _ => (0.0, -s),
            },
            // square pattern with the two short sides flown at half speed
            Shape::Rectangle => match segment_index(elapsed, 4) {
                0 => (s, 0.0),
                1 => (0.0, s * 0.5),
                2 => (-s, 0.0),
                _ => (0.0, -s * 0.5),
            },
            Shape::Triangle => match segment_index(elapsed, 3) {
                0 => (s, 0.0),
                1 => (-s * 0.5, s * TRIANGLE_LATERAL),
                _ => (-s * 0.5, -s * TRIANGLE_LATERAL),
            },
            // five equal segments around a regular polygon, heading k·72°
            Shape::Pentagon => {
                let k = segment_index(elapsed, 5) as f32;
                let heading = k * 2.0 * PI / 5.0;
                (s * heading.cos(), s * heading.sin())
            }
            Shape::Oval => {
                let t = elapsed.as_secs_f32();
                (s * t.cos(), s * 0.5 * t.sin())
            }
        }
    }
}

/// Which constant-velocity segment `elapsed` falls into for an `n`-segment
/// cyclic pattern.
pub fn segment_index(elapsed: Duration, n: u32) -> usize {
    ((elapsed.as_millis() / SEGMENT_DURATION.as_millis()) % u128::from(n)) as usize
}

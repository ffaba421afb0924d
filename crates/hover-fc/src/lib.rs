//! Collaborator seams around the navigation core: range sensors feeding it
//! and the stabilizer consuming its setpoints, plus simulated
//! implementations for bench runs.

pub mod sensors;
pub mod sim;

pub use sensors::{RangeSensors, Stabilizer};
pub use sim::{LogStabilizer, ScriptedSensors, SensorPhase, SensorSimConfig};

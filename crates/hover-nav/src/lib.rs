pub mod altitude;
pub mod doctor;
pub mod obstacle;
pub mod supervisor;
pub mod trajectory;
pub mod watchdog;

pub use supervisor::{NavConfig, NavState, Setpoint, Supervisor};
pub use trajectory::Shape;

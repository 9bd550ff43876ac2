//! Hardware abstraction traits
//!
//! These traits define the interface between the instrument logic
//! and hardware-specific implementations.

pub mod photometer;
pub mod stepper;

pub use photometer::{LightSensor, RgbDrive, SensorError, DRIVE_LEVEL_MAX};
pub use stepper::{PhaseOutput, COIL_COUNT};

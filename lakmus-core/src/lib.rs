//! Board-agnostic core logic for the Lakmus pH analyzer firmware
//!
//! This crate contains all instrument logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (stepper coils, illuminator, light sensor)
//! - Carousel position model and minimum-step route planning
//! - Photometric calibration and measurement data types
//! - Nearest-neighbor pH classification
//! - The command vocabulary shared by the console and the infrared remote

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod carousel;
pub mod classify;
pub mod command;
pub mod photometry;
pub mod traits;

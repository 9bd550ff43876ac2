//! Hardware driver logic for the Lakmus pH analyzer
//!
//! Drivers are generic over the traits in `lakmus_core::traits` plus the
//! `embedded-hal` blocking delay, so they run unchanged on the target and
//! against mocks on the host:
//!
//! - [`carousel::CarouselDrive`] - four-phase stepper drive, routing, homing
//! - [`photometer::Photometer`] - illumination sweeps for calibration and
//!   measurement

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod carousel;
pub mod photometer;

pub use carousel::{CarouselConfig, CarouselDrive};
pub use photometer::{Photometer, PhotometerConfig};

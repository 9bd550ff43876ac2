//! Infrared Remote Control Protocol
//!
//! This crate decodes the NEC-style protocol spoken by the instrument's
//! handheld remote. The receiver demodulates the 38 kHz carrier and the
//! hardware timestamps every falling edge; this crate turns that stream of
//! edge timestamps back into validated frames.
//!
//! # Frame Overview
//!
//! One button press is 34 falling edges:
//! ```text
//! ┌──────────────┬────────────────────────────────────────────┐
//! │ LEAD         │ 32 BITS (LSB first)                        │
//! │ 9ms + 4.5ms  │ address, ~address, data, ~data (8b each)   │
//! └──────────────┴────────────────────────────────────────────┘
//! ```
//!
//! Each bit is the interval between two adjacent edges: a short interval is
//! a logical 0, a long interval a logical 1. Intervals are classified with
//! inclusive tolerance windows that absorb oscillator and capture jitter;
//! an interval outside every window discards the whole in-progress frame,
//! since one corrupted edge desynchronizes all later bit boundaries.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod frame;

pub use frame::{
    DecodeError, DecoderTiming, EdgeDecoder, RemoteFrame, ToleranceWindow, FRAME_BIT_COUNT,
    FRAME_EDGE_COUNT,
};

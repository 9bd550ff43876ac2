//! Stepper coil output trait
//!
//! The carousel motor is a four-wire unipolar stepper driven one winding
//! at a time. Implementations map the coil bitmask onto the actual output
//! pins for the board.

/// Number of motor windings.
pub const COIL_COUNT: usize = 4;

/// Discrete output for the stepper motor windings.
pub trait PhaseOutput {
    /// Energize the windings selected by `coils`.
    ///
    /// Bit `n` of `coils` energizes winding `n`; bits above
    /// [`COIL_COUNT`] are ignored. All other windings are released.
    fn energize(&mut self, coils: u8);
}

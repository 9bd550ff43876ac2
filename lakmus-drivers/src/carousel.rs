//! Carousel stepper drive
//!
//! Wave drive for the four-wire unipolar carousel stepper: one winding is
//! energized per phase, and every step holds the new pattern for a settle
//! delay before the next one may begin.

use embedded_hal::delay::DelayNs;

use lakmus_core::carousel::{plan_route_to_slot, Carousel, Direction, DrivePhase, TubeSlot};
use lakmus_core::traits::PhaseOutput;

/// Coil pattern applied for each drive phase, indexed by
/// [`DrivePhase::index`]. One winding at a time.
const WAVE_SEQUENCE: [u8; DrivePhase::COUNT as usize] = [0b0100, 0b0010, 0b1000, 0b0001];

/// Carousel drive configuration.
#[derive(Debug, Clone)]
pub struct CarouselConfig {
    /// Hold time after each step, in microseconds. Must cover the motor's
    /// minimum step period.
    pub step_settle_us: u32,
    /// Homing run length, in steps. Longer than the full travel so the
    /// carousel always reaches the end-stop.
    pub homing_travel_steps: u8,
    /// Steps backed off the end-stop after the homing run, so the zero
    /// datum is always approached from the same direction.
    pub homing_backoff_steps: u8,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            step_settle_us: 10_000,
            homing_travel_steps: 200,
            homing_backoff_steps: 5,
        }
    }
}

/// Stepper drive owning the carousel position state.
pub struct CarouselDrive<P, D> {
    coils: P,
    delay: D,
    state: Carousel,
    config: CarouselConfig,
}

impl<P: PhaseOutput, D: DelayNs> CarouselDrive<P, D> {
    /// Create a drive at the power-on position datum.
    ///
    /// The datum is meaningless until [`home`](Self::home) has run.
    pub fn new(coils: P, delay: D, config: CarouselConfig) -> Self {
        Self {
            coils,
            delay,
            state: Carousel::new(),
            config,
        }
    }

    /// Current carousel position.
    pub fn position(&self) -> u8 {
        self.state.position()
    }

    /// Issue one step and hold through the settle delay.
    fn step(&mut self, direction: Direction) {
        self.state.record_step(direction);
        self.coils
            .energize(WAVE_SEQUENCE[self.state.phase().index() as usize]);
        self.delay.delay_us(self.config.step_settle_us);
    }

    /// Rotate the requested tube slot into the light path, taking the
    /// shorter way around.
    pub fn route_to(&mut self, slot: TubeSlot) {
        let plan = plan_route_to_slot(self.state.position(), slot);
        for _ in 0..plan.steps {
            self.step(plan.direction);
        }
    }

    /// Seat the carousel against the end-stop and define that point as
    /// position zero.
    ///
    /// Runs clockwise past the full travel, then backs off a few steps so
    /// the zero datum is seated from one direction regardless of starting
    /// backlash.
    pub fn home(&mut self) {
        for _ in 0..self.config.homing_travel_steps {
            self.step(Direction::Clockwise);
        }
        for _ in 0..self.config.homing_backoff_steps {
            self.step(Direction::CounterClockwise);
        }
        self.state.rezero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    // Mock coil bank recording every pattern applied
    #[derive(Default)]
    struct MockCoils {
        patterns: Vec<u8>,
    }

    impl PhaseOutput for MockCoils {
        fn energize(&mut self, coils: u8) {
            self.patterns.push(coils);
        }
    }

    // Mock delay accumulating requested settle time
    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn test_drive() -> CarouselDrive<MockCoils, MockDelay> {
        CarouselDrive::new(
            MockCoils::default(),
            MockDelay::default(),
            CarouselConfig::default(),
        )
    }

    #[test]
    fn test_route_takes_minimum_steps() {
        let mut drive = test_drive();

        drive.home();
        let steps_after_home = drive.coils.patterns.len();
        assert_eq!(steps_after_home, 205);

        drive.route_to(TubeSlot::new(3).unwrap());
        assert_eq!(drive.position(), 96);
        assert_eq!(drive.coils.patterns.len() - steps_after_home, 96);
    }

    #[test]
    fn test_route_wraps_the_short_way() {
        let mut drive = test_drive();
        drive.home();

        drive.route_to(TubeSlot::new(5).unwrap());
        assert_eq!(drive.position(), 162);
        let before = drive.coils.patterns.len();

        // 162 -> 28: 122 steps forward across the u8 wrap beats 134 back.
        drive.route_to(TubeSlot::new(1).unwrap());
        assert_eq!(drive.position(), 28);
        assert_eq!(drive.coils.patterns.len() - before, 122);
    }

    #[test]
    fn test_home_rezeros_from_any_start() {
        let mut drive = test_drive();

        drive.home();
        drive.route_to(TubeSlot::new(4).unwrap());
        assert_eq!(drive.position(), 129);

        drive.home();
        assert_eq!(drive.position(), 0);
    }

    #[test]
    fn test_wave_sequence_cycles() {
        let mut drive = test_drive();
        drive.route_to(TubeSlot::new(1).unwrap());

        // Exactly one winding energized per step, cycling through all four.
        for pattern in &drive.coils.patterns {
            assert_eq!(pattern.count_ones(), 1);
        }
        for window in drive.coils.patterns.windows(4) {
            let mut all: Vec<u8> = window.to_vec();
            all.sort_unstable();
            assert_eq!(all, [0b0001, 0b0010, 0b0100, 0b1000]);
        }
    }

    #[test]
    fn test_settle_delay_per_step() {
        let mut drive = test_drive();
        drive.route_to(TubeSlot::new(1).unwrap());

        // 28 steps at 10 ms each.
        assert_eq!(drive.delay.total_ns, 28 * 10_000_000);
    }

    #[test]
    fn test_reverse_retraces_patterns() {
        let mut drive = test_drive();
        drive.home();
        drive.route_to(TubeSlot::new(1).unwrap());
        let forward = drive.coils.patterns.clone();

        drive.route_to(TubeSlot::REFERENCE);
        let backward = &drive.coils.patterns[forward.len()..];

        // Stepping back retraces the forward patterns in reverse order,
        // starting one before the currently held pattern.
        assert_eq!(backward.len(), 28);
        let retrace: Vec<u8> = forward[forward.len() - 29..forward.len() - 1]
            .iter()
            .rev()
            .copied()
            .collect();
        assert_eq!(backward, retrace.as_slice());
    }
}

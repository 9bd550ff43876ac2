//! Photometer driver
//!
//! Drives the three-channel illuminator against the single photodetector.
//! Calibration sweeps each channel's drive level up from zero until the
//! sensor crosses the saturation threshold; measurement replays each sweep
//! up to the calibrated level and keeps the final reading.
//!
//! Calibration must run with the light path in its reference state (tubes
//! retracted or the reference tube seated, per deployment convention);
//! that is the caller's responsibility.

use embedded_hal::delay::DelayNs;

use lakmus_core::photometry::{ChannelCalibration, ColorSample, LightChannel, SessionCalibration};
use lakmus_core::traits::{LightSensor, RgbDrive, SensorError, DRIVE_LEVEL_MAX};

/// Photometer sweep configuration.
#[derive(Debug, Clone)]
pub struct PhotometerConfig {
    /// Sensor reading that stops a calibration sweep. Chosen below the ADC
    /// ceiling so the recorded reference keeps a margin to saturation.
    pub threshold: u16,
    /// Settle time after each calibration drive step, in microseconds.
    pub calibrate_settle_us: u32,
    /// Settle time after each measurement drive step, in microseconds.
    pub measure_settle_us: u32,
    /// Settle time with all channels dark, before and between sweeps.
    pub dark_settle_us: u32,
}

impl Default for PhotometerConfig {
    fn default() -> Self {
        Self {
            threshold: 3072,
            calibrate_settle_us: 30_000,
            measure_settle_us: 1_000,
            dark_settle_us: 10_000,
        }
    }
}

/// Illumination sweep engine over an RGB drive and a light sensor.
pub struct Photometer<L, S, D> {
    light: L,
    sensor: S,
    delay: D,
    config: PhotometerConfig,
}

impl<L: RgbDrive, S: LightSensor, D: DelayNs> Photometer<L, S, D> {
    /// Create a photometer. The illuminator is assumed dark.
    pub fn new(light: L, sensor: S, delay: D, config: PhotometerConfig) -> Self {
        Self {
            light,
            sensor,
            delay,
            config,
        }
    }

    /// Drive one channel at `level`, the other two dark.
    fn apply(&mut self, channel: LightChannel, level: u16) {
        match channel {
            LightChannel::Red => self.light.set_levels(level, 0, 0),
            LightChannel::Green => self.light.set_levels(0, level, 0),
            LightChannel::Blue => self.light.set_levels(0, 0, level),
        }
    }

    /// Run the full calibration pass and leave the illuminator dark.
    pub fn calibrate(&mut self) -> Result<SessionCalibration, SensorError> {
        let session = self.calibration_sweeps();
        self.light.all_off();
        session
    }

    fn calibration_sweeps(&mut self) -> Result<SessionCalibration, SensorError> {
        let red = self.calibration_sweep(LightChannel::Red)?;
        let green = self.calibration_sweep(LightChannel::Green)?;
        let blue = self.calibration_sweep(LightChannel::Blue)?;
        Ok(SessionCalibration { red, green, blue })
    }

    /// Sweep one channel upward until the sensor crosses the threshold or
    /// the drive level tops out, and record where the sweep stopped.
    fn calibration_sweep(
        &mut self,
        channel: LightChannel,
    ) -> Result<ChannelCalibration, SensorError> {
        let mut raw = 0;
        for level in 0..=DRIVE_LEVEL_MAX {
            self.apply(channel, level);
            self.delay.delay_us(self.config.calibrate_settle_us);
            raw = self.sensor.read()?;
            if raw >= self.config.threshold {
                return Ok(ChannelCalibration {
                    drive_level: level,
                    raw,
                    reached_threshold: true,
                });
            }
        }
        Ok(ChannelCalibration {
            drive_level: DRIVE_LEVEL_MAX,
            raw,
            reached_threshold: false,
        })
    }

    /// Measure the tube currently in the light path.
    ///
    /// Each channel ramps from zero to its calibrated level and the final
    /// (saturating) reading becomes that channel's raw value. Sweeps never
    /// drive past the session calibration.
    pub fn measure(&mut self, calibration: &SessionCalibration) -> Result<ColorSample, SensorError> {
        self.light.all_off();
        self.delay.delay_us(self.config.dark_settle_us);

        let sample = self.measurement_sweeps(calibration);
        self.light.all_off();
        sample
    }

    fn measurement_sweeps(
        &mut self,
        calibration: &SessionCalibration,
    ) -> Result<ColorSample, SensorError> {
        let red = self.measurement_sweep(LightChannel::Red, calibration.red.drive_level)?;
        self.light.all_off();
        self.delay.delay_us(self.config.dark_settle_us);

        let green = self.measurement_sweep(LightChannel::Green, calibration.green.drive_level)?;
        self.light.all_off();
        self.delay.delay_us(self.config.dark_settle_us);

        let blue = self.measurement_sweep(LightChannel::Blue, calibration.blue.drive_level)?;
        Ok(ColorSample { red, green, blue })
    }

    /// Ramp one channel to `limit` and return the last reading.
    fn measurement_sweep(
        &mut self,
        channel: LightChannel,
        limit: u16,
    ) -> Result<u16, SensorError> {
        let mut raw = 0;
        for level in 0..=limit {
            self.apply(channel, level);
            self.delay.delay_us(self.config.measure_settle_us);
            raw = self.sensor.read()?;
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    type Levels = Rc<RefCell<(u16, u16, u16)>>;

    // Mock illuminator sharing its current levels with the mock sensor
    struct MockLight {
        levels: Levels,
        history: Vec<(u16, u16, u16)>,
    }

    impl RgbDrive for MockLight {
        fn set_levels(&mut self, red: u16, green: u16, blue: u16) {
            *self.levels.borrow_mut() = (red, green, blue);
            self.history.push((red, green, blue));
        }
    }

    // Mock sensor responding to whichever channel is currently driven
    struct MockSensor {
        levels: Levels,
        response: fn(u16) -> u16,
        fail_after: Option<u32>,
        reads: u32,
    }

    impl LightSensor for MockSensor {
        fn read(&mut self) -> Result<u16, SensorError> {
            self.reads += 1;
            if let Some(limit) = self.fail_after {
                if self.reads > limit {
                    return Err(SensorError::ConversionFailed);
                }
            }
            let (red, green, blue) = *self.levels.borrow();
            Ok((self.response)(red.max(green).max(blue)))
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn photometer(
        response: fn(u16) -> u16,
        fail_after: Option<u32>,
    ) -> Photometer<MockLight, MockSensor, MockDelay> {
        let levels: Levels = Rc::new(RefCell::new((0, 0, 0)));
        Photometer::new(
            MockLight {
                levels: Rc::clone(&levels),
                history: Vec::new(),
            },
            MockSensor {
                levels,
                response,
                fail_after,
                reads: 0,
            },
            MockDelay::default(),
            PhotometerConfig::default(),
        )
    }

    fn calibration(red: u16, green: u16, blue: u16) -> SessionCalibration {
        let channel = |drive_level| ChannelCalibration {
            drive_level,
            raw: 3100,
            reached_threshold: true,
        };
        SessionCalibration {
            red: channel(red),
            green: channel(green),
            blue: channel(blue),
        }
    }

    #[test]
    fn test_calibration_stops_at_threshold() {
        // Reading rises 10 counts per drive step: crosses 3072 at level 308.
        let mut photometer = photometer(|level| level.saturating_mul(10), None);
        let session = photometer.calibrate().unwrap();

        for channel in LightChannel::ALL {
            let sweep = session.channel(channel);
            assert!(sweep.reached_threshold);
            assert_eq!(sweep.drive_level, 308);
            assert!(sweep.raw >= 3072);
        }
        // Illuminator left dark.
        assert_eq!(*photometer.light.history.last().unwrap(), (0, 0, 0));
    }

    #[test]
    fn test_calibration_runs_out_of_drive() {
        // A dim channel never reaches the threshold; the sweep must stop at
        // the ceiling and say so.
        let mut photometer = photometer(|level| level / 2, None);
        let session = photometer.calibrate().unwrap();

        assert!(!session.red.reached_threshold);
        assert_eq!(session.red.drive_level, DRIVE_LEVEL_MAX);
        assert_eq!(session.red.raw, DRIVE_LEVEL_MAX / 2);
    }

    #[test]
    fn test_one_channel_at_a_time() {
        let mut photometer = photometer(|level| level.saturating_mul(10), None);
        photometer.calibrate().unwrap();
        photometer.measure(&calibration(20, 20, 20)).unwrap();

        for (red, green, blue) in &photometer.light.history {
            let driven = [red, green, blue].into_iter().filter(|&&l| l > 0).count();
            assert!(driven <= 1);
        }
    }

    #[test]
    fn test_measurement_bounded_by_calibration() {
        let mut photometer = photometer(|level| level.saturating_mul(3), None);
        let session = calibration(100, 50, 25);
        let sample = photometer.measure(&session).unwrap();

        let max_red = photometer.light.history.iter().map(|l| l.0).max().unwrap();
        let max_green = photometer.light.history.iter().map(|l| l.1).max().unwrap();
        let max_blue = photometer.light.history.iter().map(|l| l.2).max().unwrap();
        assert_eq!((max_red, max_green, max_blue), (100, 50, 25));

        // Final reading is the response at the calibrated level.
        assert_eq!(sample.red, 300);
        assert_eq!(sample.green, 150);
        assert_eq!(sample.blue, 75);

        // All channels dark between sweeps and at the end.
        assert_eq!(*photometer.light.history.last().unwrap(), (0, 0, 0));
    }

    #[test]
    fn test_measurement_settle_accounting() {
        let mut photometer = photometer(|level| level, None);
        photometer.measure(&calibration(9, 4, 1)).unwrap();

        // Three dark settles (before red, after red, after green) plus one
        // measurement settle per drive step including level zero.
        let dark_ns = 3 * 10_000_000u64;
        let step_ns = u64::from((9u16 + 1) + (4 + 1) + (1 + 1)) * 1_000_000;
        assert_eq!(photometer.delay.total_ns, dark_ns + step_ns);
    }

    #[test]
    fn test_sensor_fault_propagates_and_goes_dark() {
        let mut photometer = photometer(|level| level, Some(5));
        let result = photometer.measure(&calibration(100, 100, 100));

        assert_eq!(result, Err(SensorError::ConversionFailed));
        assert_eq!(*photometer.light.history.last().unwrap(), (0, 0, 0));
    }

    #[test]
    fn test_calibration_reading_monotonic_stop() {
        // The recorded reading is the first one at or past the threshold,
        // not the ceiling the channel would reach at full drive.
        let mut photometer = photometer(|level| level.saturating_mul(100), None);
        let session = photometer.calibrate().unwrap();
        assert_eq!(session.green.drive_level, 31);
        assert_eq!(session.green.raw, 3100);
    }
}

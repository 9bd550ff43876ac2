//! RP2040 peripheral glue
//!
//! Implements the core hardware traits on top of embassy-rp peripherals.
//! Pin assignments live in `main.rs`; nothing here touches registers
//! directly.

use embassy_rp::adc::{Adc, Blocking, Channel, Error as AdcError};
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};

use lakmus_core::traits::{
    LightSensor, PhaseOutput, RgbDrive, SensorError, COIL_COUNT, DRIVE_LEVEL_MAX,
};

/// Stepper winding outputs, one GPIO per coil.
pub struct CoilBank {
    coils: [Output<'static>; COIL_COUNT],
}

impl CoilBank {
    pub fn new(coils: [Output<'static>; COIL_COUNT]) -> Self {
        Self { coils }
    }
}

impl PhaseOutput for CoilBank {
    fn energize(&mut self, pattern: u8) {
        for (bit, coil) in self.coils.iter_mut().enumerate() {
            if pattern >> bit & 1 == 1 {
                coil.set_high();
            } else {
                coil.set_low();
            }
        }
    }
}

/// Illuminator over three PWM slices, each using its A output.
///
/// The counter top is [`DRIVE_LEVEL_MAX`], so a drive level is the compare
/// value directly.
pub struct PwmIlluminator {
    channels: [Pwm<'static>; 3],
    config: PwmConfig,
}

impl PwmIlluminator {
    pub fn new(red: Pwm<'static>, green: Pwm<'static>, blue: Pwm<'static>) -> Self {
        let mut config = PwmConfig::default();
        config.top = DRIVE_LEVEL_MAX;
        let mut illuminator = Self {
            channels: [red, green, blue],
            config,
        };
        illuminator.all_off();
        illuminator
    }
}

impl RgbDrive for PwmIlluminator {
    fn set_levels(&mut self, red: u16, green: u16, blue: u16) {
        for (pwm, level) in self.channels.iter_mut().zip([red, green, blue]) {
            self.config.compare_a = level.min(DRIVE_LEVEL_MAX);
            pwm.set_config(&self.config);
        }
    }
}

/// Photodetector on the ADC, read in blocking mode.
pub struct AdcSensor {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl AdcSensor {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl LightSensor for AdcSensor {
    fn read(&mut self) -> Result<u16, SensorError> {
        self.adc
            .blocking_read(&mut self.channel)
            .map_err(|_: AdcError| SensorError::ConversionFailed)
    }
}

//! Controller - the single dispatch context
//!
//! Every hardware-owning operation runs here, serialized by the
//! capacity-one command mailbox. Stepping, calibration and measurement
//! block this task for their full duration; commands arriving meanwhile
//! are rejected at the mailbox by the producers, never queued or
//! preempted.

use core::fmt::Write as _;

use defmt::*;
use embedded_hal::delay::DelayNs;

use lakmus_core::carousel::TubeSlot;
use lakmus_core::classify::{classify, REFERENCE_LIBRARY};
use lakmus_core::command::Command;
use lakmus_core::photometry::{ColorSample, LightChannel, SessionCalibration};
use lakmus_core::traits::{LightSensor, PhaseOutput, RgbDrive, SensorError};
use lakmus_drivers::{CarouselDrive, Photometer};

use crate::channels::{ReportLine, COMMAND_MAILBOX, REPORT_CHANNEL};

/// Why a measurement could not produce a sample.
enum MeasureFault {
    /// No calibration session exists (startup calibration failed).
    NotCalibrated,
    /// The sensor faulted mid-sweep.
    Sensor(SensorError),
}

/// Owns the carousel, the photometer, and the session calibration.
pub struct Controller<P, L, S, D> {
    carousel: CarouselDrive<P, D>,
    photometer: Photometer<L, S, D>,
    calibration: Option<SessionCalibration>,
}

impl<P, L, S, D> Controller<P, L, S, D>
where
    P: PhaseOutput,
    L: RgbDrive,
    S: LightSensor,
    D: DelayNs,
{
    pub fn new(carousel: CarouselDrive<P, D>, photometer: Photometer<L, S, D>) -> Self {
        Self {
            carousel,
            photometer,
            calibration: None,
        }
    }

    /// Boot the instrument, then dispatch commands forever.
    pub async fn run(&mut self) -> ! {
        info!("Homing carousel");
        self.carousel.home();

        info!("Running startup calibration");
        self.execute(Command::Calibrate).await;

        info!("Instrument idle, accepting commands");
        loop {
            let command = COMMAND_MAILBOX.receive().await;
            self.execute(command).await;
        }
    }

    async fn execute(&mut self, command: Command) {
        debug!("Dispatch: {:?}", command);
        match command {
            Command::Home => {
                self.carousel.home();
            }
            Command::Calibrate => self.run_calibration().await,
            Command::SelectTube(slot) => {
                self.carousel.route_to(slot);
            }
            Command::Measure(slot) => match self.measure_tube(slot) {
                Ok(sample) => self.report_sample(&sample).await,
                Err(fault) => self.report_fault(fault).await,
            },
            Command::MeasurePh(slot) => match self.measure_tube(slot) {
                Ok(sample) => {
                    let result = classify(&sample, &REFERENCE_LIBRARY);
                    let mut line = ReportLine::new();
                    let _ = write!(line, "pH: {:.2}", result.ph);
                    REPORT_CHANNEL.send(line).await;
                }
                Err(fault) => self.report_fault(fault).await,
            },
        }
    }

    async fn run_calibration(&mut self) {
        match self.photometer.calibrate() {
            Ok(session) => {
                self.report_calibration(&session).await;
                self.calibration = Some(session);
            }
            Err(e) => {
                warn!("Calibration failed: {:?}", e);
                self.report_fault(MeasureFault::Sensor(e)).await;
            }
        }
    }

    /// Route the carousel to `slot` and sweep all three channels.
    fn measure_tube(&mut self, slot: TubeSlot) -> Result<ColorSample, MeasureFault> {
        let calibration = self.calibration.ok_or(MeasureFault::NotCalibrated)?;
        self.carousel.route_to(slot);
        self.photometer
            .measure(&calibration)
            .map_err(MeasureFault::Sensor)
    }

    async fn report_sample(&self, sample: &ColorSample) {
        let mut line = ReportLine::new();
        let _ = write!(
            line,
            "({:4},{:4},{:4})",
            sample.red, sample.green, sample.blue
        );
        REPORT_CHANNEL.send(line).await;
    }

    async fn report_calibration(&self, session: &SessionCalibration) {
        for channel in LightChannel::ALL {
            let sweep = session.channel(channel);
            let suffix = if sweep.reached_threshold {
                ""
            } else {
                " (below threshold)"
            };

            let mut line = ReportLine::new();
            let _ = write!(line, "{}_drive: {:4}", channel.label(), sweep.drive_level);
            REPORT_CHANNEL.send(line).await;

            let mut line = ReportLine::new();
            let _ = write!(line, "{}_raw:   {:4}{}", channel.label(), sweep.raw, suffix);
            REPORT_CHANNEL.send(line).await;
        }
    }

    async fn report_fault(&self, fault: MeasureFault) {
        let text = match fault {
            MeasureFault::NotCalibrated => "error: not calibrated",
            MeasureFault::Sensor(_) => "error: sensor fault",
        };
        let mut line = ReportLine::new();
        let _ = line.push_str(text);
        REPORT_CHANNEL.send(line).await;
    }
}

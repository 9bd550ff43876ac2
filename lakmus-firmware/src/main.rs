//! Lakmus - Colorimetric pH Analyzer Firmware
//!
//! Main firmware binary for RP2040-based analyzer boards. A stepper-driven
//! six-tube carousel positions samples under an RGB photometer; an NEC-style
//! infrared remote and a serial console drive the instrument.
//!
//! Named after "lakmus", the word for litmus in several European languages.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lakmus_drivers::{CarouselConfig, CarouselDrive, Photometer, PhotometerConfig};

use crate::board::{AdcSensor, CoilBank, PwmIlluminator};
use crate::controller::Controller;

mod board;
mod channels;
mod controller;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// High-priority executor for the IR edge-capture task.
///
/// Edge timestamps must keep their timing while the controller blocks the
/// thread executor through a stepping or sweep operation.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lakmus firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Setup UART for the operator console
    let uart_config = UartConfig::default(); // 115200 baud default

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("Console UART initialized");

    // IR demodulator input; the receiver idles high and pulls low on carrier
    let ir_input = Input::new(p.PIN_15, Pull::Up);

    // Carousel stepper windings
    let coils = CoilBank::new([
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ]);

    // Illuminator PWM channels, one slice A-output per color
    let illuminator = PwmIlluminator::new(
        Pwm::new_output_a(p.PWM_SLICE3, p.PIN_6, PwmConfig::default()),
        Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, PwmConfig::default()),
        Pwm::new_output_a(p.PWM_SLICE5, p.PIN_10, PwmConfig::default()),
    );

    // Photodetector on ADC0
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let sensor = AdcSensor::new(adc, AdcChannel::new_pin(p.PIN_26, Pull::None));

    info!("Photometer peripherals initialized");

    let carousel = CarouselDrive::new(coils, Delay, CarouselConfig::default());
    let photometer = Photometer::new(illuminator, sensor, Delay, PhotometerConfig::default());

    // Edge capture outranks the blocking dispatch loop
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(tasks::remote_task(ir_input)).unwrap();

    spawner.spawn(tasks::console_task(rx)).unwrap();
    spawner.spawn(tasks::report_task(tx)).unwrap();

    info!("All tasks spawned, firmware running");

    // The controller is the main task: boot homing, startup calibration,
    // then dispatch commands from the mailbox forever.
    let mut controller = Controller::new(carousel, photometer);
    controller.run().await
}

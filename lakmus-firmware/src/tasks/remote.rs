//! Infrared remote receive task
//!
//! Captures falling-edge timestamps from the IR demodulator, feeds the
//! frame decoder, and submits mapped commands to the dispatch mailbox.
//! Runs on the high-priority interrupt executor so edge timing survives a
//! blocking dispatch on the thread executor.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Instant;

use lakmus_core::command::Command;
use lakmus_protocol::EdgeDecoder;

use crate::channels::COMMAND_MAILBOX;

/// Remote receive task - decodes edges into commands
#[embassy_executor::task]
pub async fn remote_task(mut ir_input: Input<'static>) {
    info!("Remote task started");

    let mut decoder = EdgeDecoder::default();

    loop {
        ir_input.wait_for_falling_edge().await;
        let tick = Instant::now().as_micros();

        match decoder.feed(tick) {
            Ok(Some(frame)) => {
                debug!(
                    "Remote frame: addr=0x{:02x} data=0x{:02x}",
                    frame.address, frame.data
                );
                match Command::from_remote_code(frame.data) {
                    Some(command) => {
                        // Reject if a dispatch is already in flight
                        if COMMAND_MAILBOX.try_send(command).is_err() {
                            warn!("Dispatch busy, remote command dropped");
                        }
                    }
                    None => trace!("Unmapped remote code 0x{:02x}", frame.data),
                }
            }
            Ok(None) => {
                // Frame still assembling
            }
            Err(e) => {
                debug!("Remote frame discarded: {:?}", e);
            }
        }
    }
}

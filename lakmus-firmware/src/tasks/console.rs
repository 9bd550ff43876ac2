//! Serial console task
//!
//! Assembles UART input into lines, parses them into commands, and submits
//! them for dispatch. Parse failures and busy rejections are reported back
//! to the operator; the loop never exits.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::String;

use lakmus_core::command::Command;

use crate::channels::{ReportLine, COMMAND_MAILBOX, REPORT_CHANNEL};

/// Longest accepted command line.
const LINE_LEN: usize = 80;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Console task - reads lines and submits commands
#[embassy_executor::task]
pub async fn console_task(mut rx: BufferedUartRx) {
    info!("Console task started");

    let mut line: String<LINE_LEN> = String::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    match byte {
                        b'\r' | b'\n' => {
                            if !line.is_empty() {
                                submit(line.as_str()).await;
                                line.clear();
                            }
                        }
                        0x08 | 0x7F => {
                            line.pop();
                        }
                        0x20..=0x7E => {
                            if line.push(byte as char).is_err() {
                                warn!("Command line too long, discarded");
                                line.clear();
                            }
                        }
                        _ => {
                            // Other control bytes are dropped
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Console read error: {:?}", e),
        }
    }
}

/// Parse one complete line and hand it to the controller.
async fn submit(line: &str) {
    match Command::parse_line(line) {
        Ok(command) => {
            // Reject if a dispatch is already in flight
            if COMMAND_MAILBOX.try_send(command).is_err() {
                warn!("Dispatch busy, console command rejected");
                report("busy").await;
            }
        }
        Err(e) => {
            debug!("Rejected command line: {:?}", e);
            let mut out = ReportLine::new();
            let _ = write!(out, "error: {e}");
            REPORT_CHANNEL.send(out).await;
        }
    }
}

async fn report(text: &str) {
    let mut out = ReportLine::new();
    let _ = out.push_str(text);
    REPORT_CHANNEL.send(out).await;
}

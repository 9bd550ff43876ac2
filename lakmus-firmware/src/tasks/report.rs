//! Console report task
//!
//! Drains formatted report lines out the console UART.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::REPORT_CHANNEL;

/// Report task - writes queued lines to the console
#[embassy_executor::task]
pub async fn report_task(mut tx: BufferedUartTx) {
    info!("Report task started");

    loop {
        let line = REPORT_CHANNEL.receive().await;
        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Console write error: {:?}", e);
            continue;
        }
        if let Err(e) = tx.write_all(b"\r\n").await {
            warn!("Console write error: {:?}", e);
        }
    }
}

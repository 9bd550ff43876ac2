//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy
//! tasks. The command mailbox is the single hand-off between the
//! asynchronous command sources (IR remote, serial console) and the
//! controller: capacity one, producers use `try_send`, so a command
//! arriving while another is in flight is rejected rather than queued.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use lakmus_core::command::Command;

/// At most one dispatch is in flight at a time.
const COMMAND_MAILBOX_SIZE: usize = 1;

/// Report lines that may queue while the controller is mid-operation.
const REPORT_CHANNEL_SIZE: usize = 8;

/// Longest report line, including formatted values.
pub const REPORT_LINE_LEN: usize = 96;

/// A formatted line on its way to the console.
pub type ReportLine = String<REPORT_LINE_LEN>;

/// Validated commands awaiting dispatch by the controller.
pub static COMMAND_MAILBOX: Channel<CriticalSectionRawMutex, Command, COMMAND_MAILBOX_SIZE> =
    Channel::new();

/// Lines to write out on the console UART.
pub static REPORT_CHANNEL: Channel<CriticalSectionRawMutex, ReportLine, REPORT_CHANNEL_SIZE> =
    Channel::new();

//! Instrument command vocabulary
//!
//! One command set is shared by the serial console and the infrared remote:
//! both sources reduce to a [`Command`] before anything touches hardware,
//! so the dispatcher does not care where a request came from.

use core::fmt;

use crate::carousel::TubeSlot;

/// Remote data bytes for direct tube selection, slots 0 through 5.
pub const REMOTE_SELECT_TUBE: [u8; 6] = [0x58, 0x54, 0x50, 0x1C, 0x18, 0x14];

/// Remote data bytes for a raw measurement, slots 0 through 5.
pub const REMOTE_MEASURE: [u8; 6] = [0x59, 0x55, 0x51, 0x1D, 0x19, 0x15];

/// Remote data bytes for measure-and-classify, slots 0 through 5.
pub const REMOTE_MEASURE_PH: [u8; 6] = [0x45, 0x49, 0x4D, 0x1E, 0x1A, 0x16];

/// Remote data byte for homing the carousel.
pub const REMOTE_HOME: u8 = 0x5C;

/// Remote data byte for rerunning calibration.
pub const REMOTE_CALIBRATE: u8 = 0x5D;

/// A validated instrument command, ready to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Rerun the illumination calibration sweeps.
    Calibrate,
    /// Seat the carousel against the end-stop and rezero.
    Home,
    /// Rotate the selected tube into the light path.
    SelectTube(TubeSlot),
    /// Measure the raw color triple for a tube.
    Measure(TubeSlot),
    /// Measure a tube and classify the reading as a pH value.
    MeasurePh(TubeSlot),
}

/// Why a console line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// First token does not name a command.
    UnknownCommand,
    /// Too few or too many fields for the named command.
    WrongArgumentCount,
    /// A field that should be a slot number or `R` is neither.
    InvalidArgument,
    /// Slot number past the last carousel slot.
    InvalidTubeSelection,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            CommandError::UnknownCommand => "unknown command",
            CommandError::WrongArgumentCount => "wrong argument count",
            CommandError::InvalidArgument => "invalid argument",
            CommandError::InvalidTubeSelection => "invalid tube selection",
        };
        f.write_str(message)
    }
}

impl Command {
    /// Map a validated remote data byte to a command.
    ///
    /// An unmapped byte is not an error; the button press is ignored.
    pub fn from_remote_code(code: u8) -> Option<Command> {
        if code == REMOTE_HOME {
            return Some(Command::Home);
        }
        if code == REMOTE_CALIBRATE {
            return Some(Command::Calibrate);
        }

        let slot_command = |table: &[u8; 6], make: fn(TubeSlot) -> Command| {
            table
                .iter()
                .position(|&c| c == code)
                .and_then(|index| TubeSlot::new(index as u8))
                .map(make)
        };

        slot_command(&REMOTE_SELECT_TUBE, Command::SelectTube)
            .or_else(|| slot_command(&REMOTE_MEASURE, Command::Measure))
            .or_else(|| slot_command(&REMOTE_MEASURE_PH, Command::MeasurePh))
    }

    /// Parse a console line.
    ///
    /// The first field selects the command (case-sensitive); fields are
    /// separated by any run of non-alphanumeric characters. Argument counts
    /// are checked exactly.
    pub fn parse_line(line: &str) -> Result<Command, CommandError> {
        let mut fields = line
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|field| !field.is_empty());

        let name = fields.next().ok_or(CommandError::UnknownCommand)?;
        let command = match name {
            "calibrate" => Command::Calibrate,
            "home" => Command::Home,
            "tube" => Command::SelectTube(parse_slot(fields.next())?),
            "measure" => Command::Measure(parse_slot(fields.next())?),
            "measurePh" => Command::MeasurePh(parse_slot(fields.next())?),
            _ => return Err(CommandError::UnknownCommand),
        };

        if fields.next().is_some() {
            return Err(CommandError::WrongArgumentCount);
        }
        Ok(command)
    }
}

/// Parse a slot field: a slot number, or the literal `R` for the
/// reference tube.
fn parse_slot(field: Option<&str>) -> Result<TubeSlot, CommandError> {
    let field = field.ok_or(CommandError::WrongArgumentCount)?;
    if field == "R" {
        return Ok(TubeSlot::REFERENCE);
    }

    let index: u32 = field
        .parse()
        .map_err(|_| CommandError::InvalidArgument)?;
    u8::try_from(index)
        .ok()
        .and_then(TubeSlot::new)
        .ok_or(CommandError::InvalidTubeSelection)
}

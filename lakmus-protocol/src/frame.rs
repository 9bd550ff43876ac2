//! Edge-timestamp frame decoding for the infrared remote.

/// Falling edges in one complete frame: the lead pair plus 32 bits.
pub const FRAME_EDGE_COUNT: usize = 34;

/// Payload bits in one frame.
pub const FRAME_BIT_COUNT: usize = 32;

/// Inclusive range of tick counts accepted for one protocol symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToleranceWindow {
    pub min: u64,
    pub max: u64,
}

impl ToleranceWindow {
    /// Create a window accepting `min..=max` ticks.
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Whether `interval` falls inside the window.
    pub fn contains(&self, interval: u64) -> bool {
        interval >= self.min && interval <= self.max
    }
}

/// Tolerance windows for the three symbol durations.
///
/// Tick units are whatever the edge timestamps are captured in; the
/// defaults assume microsecond ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderTiming {
    /// The lead 9 ms pulse + 4.5 ms space pair, edge to edge.
    pub lead: ToleranceWindow,
    /// A logical-0 bit duration (562.5 µs pulse + 562.5 µs space).
    pub bit_zero: ToleranceWindow,
    /// A logical-1 bit duration (562.5 µs pulse + 1687.5 µs space).
    pub bit_one: ToleranceWindow,
}

impl DecoderTiming {
    /// Windows in microsecond ticks.
    pub const MICROS: DecoderTiming = DecoderTiming {
        lead: ToleranceWindow::new(13_000, 14_000),
        bit_zero: ToleranceWindow::new(844, 1_406),
        bit_one: ToleranceWindow::new(1_969, 2_531),
    };
}

impl Default for DecoderTiming {
    fn default() -> Self {
        Self::MICROS
    }
}

/// A complete decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteFrame {
    pub address: u8,
    pub address_inv: u8,
    pub data: u8,
    pub data_inv: u8,
}

impl RemoteFrame {
    /// Whether both complement bytes check out.
    pub fn is_valid(&self) -> bool {
        self.address == !self.address_inv && self.data == !self.data_inv
    }
}

/// Errors that reject an in-progress frame.
///
/// Every error also resets the decoder; the edge that triggered it is
/// discarded with the rest of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Second edge did not arrive a lead-pair interval after the first.
    LeadOutOfTolerance,
    /// A bit interval matched neither the 0 nor the 1 window.
    BitOutOfTolerance,
    /// All 34 edges arrived but a complement byte does not match.
    ComplementMismatch,
}

/// State machine reassembling frames from falling-edge timestamps.
///
/// Feed it the captured tick count of every qualifying edge; it hands back
/// a [`RemoteFrame`] once 34 edges with in-tolerance spacing have arrived
/// and the complements validate.
#[derive(Debug, Clone)]
pub struct EdgeDecoder {
    timing: DecoderTiming,
    edges: [u64; FRAME_EDGE_COUNT],
    count: usize,
}

impl Default for EdgeDecoder {
    fn default() -> Self {
        Self::new(DecoderTiming::MICROS)
    }
}

impl EdgeDecoder {
    /// Create a decoder with the given tolerance windows.
    pub fn new(timing: DecoderTiming) -> Self {
        Self {
            timing,
            edges: [0; FRAME_EDGE_COUNT],
            count: 0,
        }
    }

    /// Discard any in-progress frame.
    pub fn reset(&mut self) {
        self.count = 0;
    }

    /// Feed one falling-edge timestamp to the decoder.
    ///
    /// Returns `Ok(Some(frame))` when this edge completes a valid frame,
    /// `Ok(None)` while a frame is still assembling, or `Err` when the edge
    /// violates the protocol (which also discards all progress).
    ///
    /// Timestamps come from a free-running counter; intervals use wrapping
    /// subtraction so counter rollover cannot panic.
    pub fn feed(&mut self, tick: u64) -> Result<Option<RemoteFrame>, DecodeError> {
        match self.count {
            0 => {
                self.edges[0] = tick;
                self.count = 1;
                Ok(None)
            }
            1 => {
                let interval = tick.wrapping_sub(self.edges[0]);
                if !self.timing.lead.contains(interval) {
                    self.reset();
                    return Err(DecodeError::LeadOutOfTolerance);
                }
                self.edges[1] = tick;
                self.count = 2;
                Ok(None)
            }
            n => {
                let interval = tick.wrapping_sub(self.edges[n - 1]);
                if !self.timing.bit_zero.contains(interval)
                    && !self.timing.bit_one.contains(interval)
                {
                    self.reset();
                    return Err(DecodeError::BitOutOfTolerance);
                }
                self.edges[n] = tick;
                self.count = n + 1;

                if self.count < FRAME_EDGE_COUNT {
                    return Ok(None);
                }

                let frame = self.assemble();
                self.reset();
                if frame.is_valid() {
                    Ok(Some(frame))
                } else {
                    Err(DecodeError::ComplementMismatch)
                }
            }
        }
    }

    /// Pack the 32 bit intervals into the four payload bytes, LSB first.
    fn assemble(&self) -> RemoteFrame {
        let mut payload: u32 = 0;
        for bit in 0..FRAME_BIT_COUNT {
            let interval = self.edges[bit + 2].wrapping_sub(self.edges[bit + 1]);
            if self.timing.bit_one.contains(interval) {
                payload |= 1 << bit;
            }
        }

        RemoteFrame {
            address: payload as u8,
            address_inv: (payload >> 8) as u8,
            data: (payload >> 16) as u8,
            data_inv: (payload >> 24) as u8,
        }
    }
}

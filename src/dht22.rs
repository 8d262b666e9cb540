// DHT22 (AM2302) over its single-wire protocol. Host start pulse >= 1 ms,
// sensor answers low -> high -> low (~80 us each), then 40 bits: ~50 us low
// followed by ~26 us high (0) or ~70 us high (1). Byte 5 is the low byte of
// the sum of the first four.

use core::fmt;

use log::{debug, warn};

use crate::platform::{Clock, LineMode, SingleWireLine};

pub const ERROR_VALUE: f32 = -999.0;

const FRAME_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhtTiming {
    pub start_low_ms: u32,
    pub release_us: u32,
    pub handshake_timeout_us: u64,
    pub bit_timeout_us: u64,
    // High pulses strictly longer than this decode as 1.
    pub one_threshold_us: u64,
}

impl Default for DhtTiming {
    fn default() -> Self {
        Self {
            start_low_ms: 2,
            release_us: 40,
            handshake_timeout_us: 1_000,
            bit_timeout_us: 1_000,
            one_threshold_us: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DhtReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn expected_checksum(&self) -> u8 {
        self.0[..4].iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
    }

    pub fn humidity_tenths(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    // Bit 15 is a sign flag, not two's complement.
    pub fn temperature_tenths(&self) -> i16 {
        let raw = u16::from_be_bytes([self.0[2], self.0[3]]);
        let magnitude = (raw & 0x7FFF) as i16;
        if raw & 0x8000 != 0 {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn decode(&self) -> Result<DhtReading, ChecksumMismatch> {
        let expected = self.expected_checksum();
        let actual = self.0[4];
        if expected != actual {
            return Err(ChecksumMismatch { expected, actual });
        }

        Ok(DhtReading {
            temperature_c: f32::from(self.temperature_tenths()) / 10.0,
            humidity_pct: f32::from(self.humidity_tenths()) / 10.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    AckLow,
    AckHigh,
    DataPreamble,
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AckLow => write!(f, "response low"),
            Self::AckHigh => write!(f, "response high"),
            Self::DataPreamble => write!(f, "data preamble"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitEdge {
    Rise,
    Fall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub expected: u8,
    pub actual: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtErrorKind {
    TimingHandshake,
    TimingBit,
    Checksum,
    Line,
}

#[derive(Debug)]
pub enum DhtError<E> {
    Handshake(HandshakeStage),
    Bit { index: u8, edge: BitEdge },
    Checksum(ChecksumMismatch),
    Line(E),
}

impl<E> DhtError<E> {
    pub fn kind(&self) -> DhtErrorKind {
        match self {
            Self::Handshake(_) => DhtErrorKind::TimingHandshake,
            Self::Bit { .. } => DhtErrorKind::TimingBit,
            Self::Checksum(_) => DhtErrorKind::Checksum,
            Self::Line(_) => DhtErrorKind::Line,
        }
    }
}

impl<E> From<ChecksumMismatch> for DhtError<E> {
    fn from(mismatch: ChecksumMismatch) -> Self {
        Self::Checksum(mismatch)
    }
}

impl<E: fmt::Display> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handshake(stage) => write!(f, "DHT22 timeout waiting for {stage}"),
            Self::Bit { index, edge } => {
                let edge = match edge {
                    BitEdge::Rise => "rising",
                    BitEdge::Fall => "falling",
                };
                write!(f, "DHT22 timeout waiting for {edge} edge of bit {index}")
            }
            Self::Checksum(m) => write!(
                f,
                "DHT22 checksum mismatch: expected {:02X}, got {:02X}",
                m.expected, m.actual
            ),
            Self::Line(err) => write!(f, "DHT22 line error: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for DhtError<E> {}

pub struct Dht22<L, C> {
    line: L,
    clock: C,
    timing: DhtTiming,
    last: DhtReading,
}

impl<L, C> Dht22<L, C>
where
    L: SingleWireLine,
    C: Clock,
{
    pub fn new(line: L, clock: C) -> Result<Self, L::Error> {
        Self::with_timing(line, clock, DhtTiming::default())
    }

    pub fn with_timing(mut line: L, clock: C, timing: DhtTiming) -> Result<Self, L::Error> {
        // idle bus is driven high
        line.set_mode(LineMode::Output)?;
        line.set_level(true)?;
        Ok(Self {
            line,
            clock,
            timing,
            last: DhtReading::default(),
        })
    }

    /// Runs one full transaction. The cached reading is only replaced on
    /// success.
    pub fn read(&mut self) -> Result<DhtReading, DhtError<L::Error>> {
        self.start_signal().map_err(DhtError::Line)?;
        self.wait_for_response()?;
        let frame = self.read_frame()?;
        debug!("DHT22 frame: {:02X?}", frame.bytes());

        let reading = frame.decode()?;
        self.last = reading;
        Ok(reading)
    }

    pub fn temperature(&self) -> f32 {
        self.last.temperature_c
    }

    pub fn humidity(&self) -> f32 {
        self.last.humidity_pct
    }

    pub fn last_reading(&self) -> DhtReading {
        self.last
    }

    fn start_signal(&mut self) -> Result<(), L::Error> {
        self.line.set_mode(LineMode::Output)?;
        self.line.set_level(false)?;
        let start = self.clock.now_us();
        self.clock.delay_ms(self.timing.start_low_ms);
        // A tick-based sleep can return early; never release before the hold
        // time has really passed.
        let hold_us = u64::from(self.timing.start_low_ms) * 1_000;
        while self.clock.now_us().saturating_sub(start) < hold_us {}

        self.line.set_level(true)?;
        self.clock.delay_us(self.timing.release_us);
        self.line.set_mode(LineMode::Input)
    }

    fn wait_for_response(&mut self) -> Result<(), DhtError<L::Error>> {
        let timeout = self.timing.handshake_timeout_us;
        for (stage, level) in [
            (HandshakeStage::AckLow, false),
            (HandshakeStage::AckHigh, true),
            (HandshakeStage::DataPreamble, false),
        ] {
            self.wait_for_level(level, timeout)
                .ok_or(DhtError::Handshake(stage))?;
        }
        Ok(())
    }

    fn read_frame(&mut self) -> Result<Frame, DhtError<L::Error>> {
        let mut data = [0u8; FRAME_LEN];
        for (byte_index, byte) in data.iter_mut().enumerate() {
            for bit in 0..8u8 {
                let index = byte_index as u8 * 8 + bit;
                *byte = (*byte << 1) | u8::from(self.read_bit(index)?);
            }
        }
        Ok(Frame(data))
    }

    fn read_bit(&mut self, index: u8) -> Result<bool, DhtError<L::Error>> {
        let timeout = self.timing.bit_timeout_us;
        self.wait_for_level(true, timeout).ok_or(DhtError::Bit {
            index,
            edge: BitEdge::Rise,
        })?;
        let high_us = self.wait_for_level(false, timeout).ok_or(DhtError::Bit {
            index,
            edge: BitEdge::Fall,
        })?;
        Ok(high_us > self.timing.one_threshold_us)
    }

    // Spins until the line reaches `high`, returning how long that took.
    fn wait_for_level(&mut self, high: bool, timeout_us: u64) -> Option<u64> {
        let start = self.clock.now_us();
        loop {
            let elapsed = self.clock.now_us().saturating_sub(start);
            if self.line.is_high() == high {
                return Some(elapsed);
            }
            if elapsed > timeout_us {
                return None;
            }
        }
    }
}

impl<L, C> Dht22<L, C>
where
    L: SingleWireLine,
    L::Error: fmt::Debug,
    C: Clock,
{
    pub fn read_sensor(&mut self) -> bool {
        match self.read() {
            Ok(_) => true,
            Err(err) => {
                warn!("DHT22 read failed: {:?}", err);
                false
            }
        }
    }

    /// Runs a full transaction and returns the temperature, or
    /// [`ERROR_VALUE`]. Calling this and [`Dht22::read_humidity`] back to
    /// back talks to the sensor twice.
    pub fn read_temperature(&mut self) -> f32 {
        if self.read_sensor() {
            self.last.temperature_c
        } else {
            ERROR_VALUE
        }
    }

    pub fn read_humidity(&mut self) -> f32 {
        if self.read_sensor() {
            self.last.humidity_pct
        } else {
            ERROR_VALUE
        }
    }
}

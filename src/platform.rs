#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    Output,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pull {
    #[default]
    Floating,
    Up,
    Down,
}

/// A GPIO line switched between output and input while a transaction runs.
pub trait SingleWireLine {
    type Error;

    fn set_mode(&mut self, mode: LineMode) -> Result<(), Self::Error>;

    /// Only meaningful while the line is in [`LineMode::Output`].
    fn set_level(&mut self, high: bool) -> Result<(), Self::Error>;

    fn is_high(&mut self) -> bool;
}

pub trait Clock {
    /// Monotonic.
    fn now_us(&self) -> u64;

    /// Blocks for at least `ms`.
    fn delay_ms(&mut self, ms: u32);

    /// Busy-waits; must not yield.
    fn delay_us(&mut self, us: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attenuation {
    Db0,
    Db2_5,
    Db6,
    Db11,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcSetup {
    pub resolution_bits: u8,
    pub attenuation: Attenuation,
}

pub trait AdcLine {
    type Error;

    fn configure(&mut self, setup: &AdcSetup) -> Result<(), Self::Error>;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

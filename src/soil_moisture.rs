// Wetter soil pulls the sensor voltage down: the dry endpoint is the larger code.

use core::fmt;

use log::debug;

use crate::platform::{AdcLine, AdcSetup, Attenuation};

/// Samples averaged per raw reading.
pub const SAMPLE_COUNT: u32 = 10;

pub const ADC_SETUP: AdcSetup = AdcSetup {
    resolution_bits: 12,
    attenuation: Attenuation::Db11,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoistureCalibration {
    pub dry: u16,
    pub wet: u16,
}

impl Default for MoistureCalibration {
    fn default() -> Self {
        Self {
            dry: 3200,
            wet: 1400,
        }
    }
}

impl MoistureCalibration {
    pub fn new(dry: u16, wet: u16) -> Self {
        Self { dry, wet }
    }

    /// Maps a raw code onto 0..=100 %, clamping outside the endpoints.
    pub fn percent(&self, raw: u16) -> f32 {
        if raw >= self.dry {
            0.0
        } else if raw <= self.wet {
            100.0
        } else {
            100.0 * f32::from(self.dry - raw) / f32::from(self.dry - self.wet)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoistureReading {
    pub raw: u16,
    pub percent: f32,
}

#[derive(Debug)]
pub enum MoistureError<E> {
    Config(E),
    Sample(E),
}

impl<E: fmt::Display> fmt::Display for MoistureError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "ADC configuration failed: {err}"),
            Self::Sample(err) => write!(f, "ADC sample failed: {err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for MoistureError<E> {}

pub struct SoilMoistureSensor<A> {
    adc: A,
    calibration: MoistureCalibration,
    last_reading: f32,
}

impl<A: AdcLine> SoilMoistureSensor<A> {
    pub fn new(adc: A, calibration: MoistureCalibration) -> Self {
        Self {
            adc,
            calibration,
            last_reading: 0.0,
        }
    }

    pub fn init(&mut self) -> Result<(), MoistureError<A::Error>> {
        self.adc.configure(&ADC_SETUP).map_err(MoistureError::Config)
    }

    /// Truncated mean of [`SAMPLE_COUNT`] consecutive samples.
    pub fn read_raw(&mut self) -> Result<u16, MoistureError<A::Error>> {
        let mut total: u32 = 0;
        for _ in 0..SAMPLE_COUNT {
            total += u32::from(self.adc.read_raw().map_err(MoistureError::Sample)?);
        }
        Ok((total / SAMPLE_COUNT) as u16)
    }

    pub fn read_percentage(&mut self) -> Result<f32, MoistureError<A::Error>> {
        Ok(self.read()?.percent)
    }

    pub fn read(&mut self) -> Result<MoistureReading, MoistureError<A::Error>> {
        let raw = self.read_raw()?;
        let percent = self.calibration.percent(raw);
        debug!("soil moisture raw {} -> {:.1}%", raw, percent);

        self.last_reading = percent;
        Ok(MoistureReading { raw, percent })
    }

    /// Takes effect on the next read; `dry > wet` is assumed, not checked.
    pub fn calibrate(&mut self, dry: u16, wet: u16) {
        self.calibration = MoistureCalibration { dry, wet };
    }

    pub fn calibration(&self) -> MoistureCalibration {
        self.calibration
    }

    pub fn last_reading(&self) -> f32 {
        self.last_reading
    }
}

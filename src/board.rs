use anyhow::Result;
use esp_idf_hal::adc::oneshot::AdcDriver;
use esp_idf_hal::gpio::{Gpio21, Gpio32};
use esp_idf_hal::peripherals::Peripherals;

use garden_probe::config::Settings;
use garden_probe::dht22::Dht22;
use garden_probe::esp::{EspAdcLine, EspClock, EspLine};
use garden_probe::platform::Pull;
use garden_probe::soil_moisture::SoilMoistureSensor;

// DHT22 data line. Needs a pull-up (external ~4.7k, internal one enabled too).
pub const DHT_GPIO: i32 = 21;
// ADC1 channel 4.
pub const SOIL_GPIO: i32 = 32;

pub struct Board {
    pub dht22: Dht22<EspLine<'static, Gpio21>, EspClock>,
    pub soil: SoilMoistureSensor<EspAdcLine<'static, Gpio32>>,
}

impl Board {
    pub fn init(settings: &Settings) -> Result<Self> {
        let Peripherals { pins, adc1, .. } = Peripherals::take()?;

        let line = EspLine::new(pins.gpio21, Pull::Up)?;
        let dht22 = Dht22::with_timing(line, EspClock, settings.dht_timing)?;

        let adc = AdcDriver::new(adc1)?;
        let soil = SoilMoistureSensor::new(EspAdcLine::new(adc, pins.gpio32), settings.calibration);

        Ok(Self { dht22, soil })
    }
}

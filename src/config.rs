// Overridable by exporting the variable of the same name at build time.

use std::time::Duration;

use crate::dht22::DhtTiming;
use crate::soil_moisture::MoistureCalibration;

const SOIL_DRY_RAW_ENV: Option<&str> = option_env!("SOIL_DRY_RAW");
const SOIL_WET_RAW_ENV: Option<&str> = option_env!("SOIL_WET_RAW");
const POLL_INTERVAL_MS_ENV: Option<&str> = option_env!("POLL_INTERVAL_MS");
const DHT_TIMEOUT_US_ENV: Option<&str> = option_env!("DHT_TIMEOUT_US");
const DHT_ONE_THRESHOLD_US_ENV: Option<&str> = option_env!("DHT_ONE_THRESHOLD_US");

const POLL_INTERVAL_MS_DEFAULT: u64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub calibration: MoistureCalibration,
    pub dht_timing: DhtTiming,
    pub poll_interval: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Overrides<'a> {
    pub soil_dry_raw: Option<&'a str>,
    pub soil_wet_raw: Option<&'a str>,
    pub poll_interval_ms: Option<&'a str>,
    pub dht_timeout_us: Option<&'a str>,
    pub dht_one_threshold_us: Option<&'a str>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_values(&Overrides {
            soil_dry_raw: SOIL_DRY_RAW_ENV,
            soil_wet_raw: SOIL_WET_RAW_ENV,
            poll_interval_ms: POLL_INTERVAL_MS_ENV,
            dht_timeout_us: DHT_TIMEOUT_US_ENV,
            dht_one_threshold_us: DHT_ONE_THRESHOLD_US_ENV,
        })
    }

    /// Missing, empty or unparsable values fall back to the defaults.
    pub fn from_values(overrides: &Overrides<'_>) -> Self {
        let calibration = MoistureCalibration::default();
        let timing = DhtTiming::default();

        let timeout_us = parse_or(overrides.dht_timeout_us, timing.handshake_timeout_us);

        Self {
            calibration: MoistureCalibration {
                dry: parse_or(overrides.soil_dry_raw, calibration.dry),
                wet: parse_or(overrides.soil_wet_raw, calibration.wet),
            },
            dht_timing: DhtTiming {
                handshake_timeout_us: timeout_us,
                bit_timeout_us: timeout_us,
                one_threshold_us: parse_or(overrides.dht_one_threshold_us, timing.one_threshold_us),
                ..timing
            },
            poll_interval: Duration::from_millis(parse_or(
                overrides.poll_interval_ms,
                POLL_INTERVAL_MS_DEFAULT,
            )),
        }
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

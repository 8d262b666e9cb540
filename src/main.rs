#[cfg(target_os = "espidf")]
mod board;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_svc::log::EspLogger;
    use esp_idf_svc::sys;
    use log::{error, info};

    use board::{Board, DHT_GPIO, SOIL_GPIO};
    use garden_probe::config::Settings;

    sys::link_patches();
    EspLogger::initialize_default();

    info!("Starting application...");
    let settings = Settings::from_env();
    info!(
        "Soil calibration dry={} wet={}, poll every {:?}",
        settings.calibration.dry, settings.calibration.wet, settings.poll_interval
    );

    let Board {
        mut dht22,
        mut soil,
    } = Board::init(&settings)?;
    info!("DHT22 sensor on GPIO{}", DHT_GPIO);

    if let Err(err) = soil.init() {
        error!("Failed to initialize soil moisture sensor: {}", err);
        return Err(err.into());
    }
    info!("Soil moisture sensor initialized on GPIO{}", SOIL_GPIO);

    let interval_ms = u32::try_from(settings.poll_interval.as_millis()).unwrap_or(u32::MAX);

    loop {
        match dht22.read() {
            Ok(reading) => info!(
                "Temperature: {:.1}°C, Humidity: {:.1}%",
                reading.temperature_c, reading.humidity_pct
            ),
            Err(err) => error!("Failed to read from DHT22 sensor: {}", err),
        }

        match soil.read() {
            Ok(reading) => info!(
                "Soil Moisture - Raw: {}, Percentage: {:.1}%",
                reading.raw, reading.percent
            ),
            Err(err) => error!("Soil moisture read error: {}", err),
        }

        FreeRtos::delay_ms(interval_ms);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!("garden-probe only runs on ESP-IDF targets; run `cargo test` for the host-side drivers");
}

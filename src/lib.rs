pub mod config;
pub mod dht22;
pub mod platform;
pub mod soil_moisture;

#[cfg(target_os = "espidf")]
pub mod esp;

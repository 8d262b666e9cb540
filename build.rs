fn main() {
    // Propagate ESP-IDF link/cfg/include args from esp-idf-sys.
    if let Err(err) = embuild::build::LinkArgs::output_propagated("ESP_IDF") {
        println!("cargo:warning=esp-idf link args not propagated: {err}");
    }
    if let Err(err) = embuild::build::CfgArgs::output_propagated("ESP_IDF") {
        println!("cargo:warning=esp-idf cfg args not propagated: {err}");
    }

    for var in [
        "SOIL_DRY_RAW",
        "SOIL_WET_RAW",
        "POLL_INTERVAL_MS",
        "DHT_TIMEOUT_US",
        "DHT_ONE_THRESHOLD_US",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }
}

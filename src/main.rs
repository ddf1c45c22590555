//! OvenPilot Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter    SerialTelemetry   ConsoleDisplay         │
//! │  (Sensor+Actuator)  (CSV sink)        (frame + plot model)   │
//! │  NvsAdapter         LogEventSink      Esp32TimeAdapter       │
//! │  (Profile+Config)   (event log)       (monotonic clock)      │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              OvenService (pure logic)                  │  │
//! │  │  Sequencer FSM · Stage PID · Relay Window · Debounce   │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use anyhow::{anyhow, Result};
use log::{info, warn};

use embedded_hal::spi::MODE_1;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::units::FromValueType;

use ovenpilot::adapters::display::ConsoleDisplay;
use ovenpilot::adapters::hardware::HardwareAdapter;
use ovenpilot::adapters::log_sink::LogEventSink;
use ovenpilot::adapters::nvs::NvsAdapter;
use ovenpilot::adapters::serial::SerialTelemetry;
use ovenpilot::adapters::time::Esp32TimeAdapter;
use ovenpilot::adapters::IoBundle;
use ovenpilot::app::ports::ConfigPort;
use ovenpilot::app::service::{restore_profile, OvenService};
use ovenpilot::config::OvenConfig;
use ovenpilot::sensors::thermocouple::Max31856;

/// Control loop pass period. Must stay well under the 100 ms display
/// refresh; 10 ms gives the debounce filter fine-grained raw samples.
const LOOP_PERIOD_MS: u64 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  OvenPilot v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    //
    // Pin map: SSR gate GPIO4, buzzer GPIO5, heartbeat LED GPIO2,
    // start/stop switch GPIO6, profile-select switch GPIO7 (both active
    // low), MAX31856 on SPI2 (SCLK 12 / SDI 11 / SDO 13 / CS 10).
    let peripherals =
        Peripherals::take().map_err(|e| anyhow!("peripherals already taken: {e}"))?;
    let pins = peripherals.pins;

    let ssr = PinDriver::output(pins.gpio4.downgrade_output())?;
    let buzzer = PinDriver::output(pins.gpio5.downgrade_output())?;
    let led = PinDriver::output(pins.gpio2.downgrade_output())?;
    let mut sw_start = PinDriver::input(pins.gpio6.downgrade())?;
    let mut sw_select = PinDriver::input(pins.gpio7.downgrade())?;
    sw_start.set_pull(Pull::Up)?;
    sw_select.set_pull(Pull::Up)?;

    let spi = SpiDriver::new(
        peripherals.spi2,
        pins.gpio12,
        pins.gpio11,
        Some(pins.gpio13),
        &SpiDriverConfig::new(),
    )?;
    let spi_dev = SpiDeviceDriver::new(
        spi,
        Some(pins.gpio10),
        &SpiConfig::new().baudrate(1.MHz().into()).data_mode(MODE_1),
    )?;
    let tc = Max31856::new(spi_dev).map_err(|e| anyhow!("MAX31856 init failed: {e}"))?;

    let mut hw = HardwareAdapter::new(tc, ssr, buzzer, led, sw_start, sw_select);

    // ── 3. Persistence: config and last-used profile ──────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({e}), running without persistence");
            NvsAdapter::default()
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({e}), using defaults");
            OvenConfig::default()
        }
    };
    let profile = restore_profile(&mut nvs);
    info!("profile: {:?} ({})", profile, profile.abbrev());

    // ── 4. Service + sinks ────────────────────────────────────
    let time = Esp32TimeAdapter::new();
    let mut io = IoBundle {
        telemetry: SerialTelemetry::new(),
        display: ConsoleDisplay::new(),
        events: LogEventSink::new(),
    };
    let mut service = OvenService::new(config, profile);
    service.start(time.now_ms(), &mut io);

    info!("system ready, entering control loop");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now = time.now_ms();
        service.tick(now, &mut hw, &mut nvs, &mut io);
        std::thread::sleep(std::time::Duration::from_millis(LOOP_PERIOD_MS));
    }
}

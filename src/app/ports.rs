//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ OvenService (domain)
//! ```
//!
//! Driven adapters (thermocouple, SSR/buzzer/LED, storage, display, serial)
//! implement these traits. The [`OvenService`](super::service::OvenService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and the whole controller runs unchanged on the host in tests.

use crate::config::OvenConfig;
use crate::drivers::switches::RawSwitch;
use crate::profile::Profile;
use crate::sensors::ThermocoupleReading;

use super::events::{AppEvent, ControlSample, DisplayFrame};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// One thermocouple conversion plus the fault status register.
    /// Called once per sample period, not every tick.
    fn read_thermocouple(&mut self) -> ThermocoupleReading;

    /// Instantaneous (bouncy) switch reading. Polled every tick and fed to
    /// the debounce filter.
    fn read_switches(&mut self) -> Option<RawSwitch>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive the solid-state relay gating the heater.
    fn set_heater(&mut self, on: bool);

    /// Drive the completion buzzer.
    fn set_buzzer(&mut self, on: bool);

    /// Drive the heartbeat LED.
    fn set_status_led(&mut self, on: bool);

    /// Kill every output — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go (serial log today, anything else tomorrow).
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Telemetry sink port (domain → CSV-over-serial)
// ───────────────────────────────────────────────────────────────

/// Receives one ordered record per second while a run is active, plus a
/// header record at run start. Intended for plotting the reflow curve on a
/// connected host.
pub trait TelemetrySink {
    /// Emitted once when a run starts.
    fn run_header(&mut self);

    /// Emitted once per second while the process status is On.
    fn sample(&mut self, sample: &ControlSample);
}

// ───────────────────────────────────────────────────────────────
// Display port (domain → front panel)
// ───────────────────────────────────────────────────────────────

/// Receives a full frame at the display refresh rate. Rendering is entirely
/// the adapter's concern — the domain only decides *what* is shown.
pub trait DisplayPort {
    fn update(&mut self, frame: &DisplayFrame);
}

// ───────────────────────────────────────────────────────────────
// Profile store port (domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Persists the selected profile id across power cycles.
///
/// Saves are best-effort fire-and-forget: a failed write is logged and
/// otherwise ignored, matching the front panel's expectation that profile
/// selection never blocks.
pub trait ProfileStore {
    /// Load the persisted profile. `Err` covers both "nothing stored yet"
    /// and "stored byte is not a valid profile id".
    fn load(&self) -> Result<Profile, StoreError>;

    /// Persist the profile id.
    fn save(&mut self, profile: Profile) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate before persisting. Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped —
/// a corrupted blob must not be able to disable the too-hot guard or stretch
/// the relay window.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    fn load(&self) -> Result<OvenConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &OvenConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ProfileStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing persisted yet (first boot).
    NotFound,
    /// Stored byte is not a valid profile id.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "profile not found"),
            Self::Corrupted => write!(f, "profile id corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

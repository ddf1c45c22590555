//! Mock port adapters for integration tests.
//!
//! Records every outbound event so tests can assert on full histories
//! without touching real GPIO/SPI registers.

use ovenpilot::app::events::{AppEvent, ControlSample, DisplayFrame};
use ovenpilot::app::ports::{
    ActuatorPort, DisplayPort, EventSink, ProfileStore, SensorPort, StoreError, TelemetrySink,
};
use ovenpilot::app::service::OvenService;
use ovenpilot::config::OvenConfig;
use ovenpilot::drivers::switches::RawSwitch;
use ovenpilot::fsm::OvenState;
use ovenpilot::profile::Profile;
use ovenpilot::sensors::ThermocoupleReading;

// ── MockHw: SensorPort + ActuatorPort ─────────────────────────

pub struct MockHw {
    /// Temperature the next sample will read.
    pub temperature_c: f32,
    /// Fault bits the next sample will read.
    pub fault_bits: u8,
    /// Raw switch level, held until changed.
    pub raw_switch: Option<RawSwitch>,

    pub heater: bool,
    pub buzzer: bool,
    pub led: bool,
}

impl MockHw {
    pub fn new(temperature_c: f32) -> Self {
        Self {
            temperature_c,
            fault_bits: 0,
            raw_switch: None,
            heater: false,
            buzzer: false,
            led: false,
        }
    }
}

impl SensorPort for MockHw {
    fn read_thermocouple(&mut self) -> ThermocoupleReading {
        ThermocoupleReading {
            celsius: self.temperature_c,
            fault_bits: self.fault_bits,
        }
    }

    fn read_switches(&mut self) -> Option<RawSwitch> {
        self.raw_switch
    }
}

impl ActuatorPort for MockHw {
    fn set_heater(&mut self, on: bool) {
        self.heater = on;
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer = on;
    }

    fn set_status_led(&mut self, on: bool) {
        self.led = on;
    }

    fn all_off(&mut self) {
        self.heater = false;
        self.buzzer = false;
        self.led = false;
    }
}

// ── MockStore: ProfileStore over a raw byte ───────────────────

pub struct MockStore {
    /// Raw persisted byte, so tests can plant garbage.
    pub raw: Option<u8>,
    /// History of successful saves.
    pub saves: Vec<Profile>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self {
            raw: None,
            saves: Vec::new(),
        }
    }

    pub fn with_byte(raw: u8) -> Self {
        Self {
            raw: Some(raw),
            saves: Vec::new(),
        }
    }
}

impl ProfileStore for MockStore {
    fn load(&self) -> Result<Profile, StoreError> {
        let raw = self.raw.ok_or(StoreError::NotFound)?;
        Profile::from_id(raw).ok_or(StoreError::Corrupted)
    }

    fn save(&mut self, profile: Profile) -> Result<(), StoreError> {
        self.raw = Some(profile.id());
        self.saves.push(profile);
        Ok(())
    }
}

// ── MockIo: TelemetrySink + DisplayPort + EventSink ───────────

#[derive(Default)]
pub struct MockIo {
    pub headers: usize,
    pub samples: Vec<ControlSample>,
    pub frames: Vec<DisplayFrame>,
    pub events: Vec<AppEvent>,
}

impl MockIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered list of state transitions observed so far.
    pub fn transitions(&self) -> Vec<(OvenState, OvenState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }
}

impl TelemetrySink for MockIo {
    fn run_header(&mut self) {
        self.headers += 1;
    }

    fn sample(&mut self, sample: &ControlSample) {
        self.samples.push(*sample);
    }
}

impl DisplayPort for MockIo {
    fn update(&mut self, frame: &DisplayFrame) {
        self.frames.push(*frame);
    }
}

impl EventSink for MockIo {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Bench: service + mocks on a simulated clock ───────────────

/// Tick granularity for all integration scenarios (ms).
pub const TICK_MS: u64 = 10;

pub struct Bench {
    pub service: OvenService,
    pub hw: MockHw,
    pub store: MockStore,
    pub io: MockIo,
    pub now_ms: u64,
    /// Highest setpoint ever commanded, sampled after every tick.
    pub max_setpoint_c: f32,
}

impl Bench {
    /// Build a bench around a service seeded with `profile`, oven at `temp`.
    pub fn new(profile: Profile, temperature_c: f32) -> Self {
        let mut bench = Self {
            service: OvenService::new(OvenConfig::default(), profile),
            hw: MockHw::new(temperature_c),
            store: MockStore::with_byte(profile.id()),
            io: MockIo::new(),
            now_ms: 0,
            max_setpoint_c: 0.0,
        };
        bench.service.start(0, &mut bench.io);
        bench
    }

    /// Advance the simulated clock by `duration_ms`, ticking the service.
    pub fn run_for(&mut self, duration_ms: u64) {
        let end = self.now_ms + duration_ms;
        while self.now_ms < end {
            self.now_ms += TICK_MS;
            self.service
                .tick(self.now_ms, &mut self.hw, &mut self.store, &mut self.io);
            self.max_setpoint_c = self.max_setpoint_c.max(self.service.setpoint_c());
        }
    }

    /// Run until the sequencer reaches `state`, with a hard time bound.
    pub fn run_until(&mut self, state: OvenState, max_ms: u64) {
        let deadline = self.now_ms + max_ms;
        while self.service.state() != state && self.now_ms < deadline {
            self.run_for(TICK_MS);
        }
        assert_eq!(
            self.service.state(),
            state,
            "did not reach {state:?} within {max_ms} ms"
        );
    }

    /// Press and release a switch, with hold time comfortably past the
    /// debounce period, then give the event one tick to be consumed.
    pub fn press(&mut self, raw: RawSwitch) {
        self.hw.raw_switch = Some(raw);
        self.run_for(150);
        self.hw.raw_switch = None;
        self.run_for(50);
    }
}

//! Application service — the hexagonal core.
//!
//! [`OvenService`] owns the sequencer FSM, the shared context, the switch
//! debouncer, and the periodic deadlines. It exposes a clean,
//! hardware-agnostic API: call [`tick`](OvenService::tick) once per loop
//! pass with the current monotonic time and the ports to drive.
//!
//! ```text
//!   SensorPort ──▶ ┌─────────────────────────────┐ ──▶ TelemetrySink
//!                  │         OvenService          │ ──▶ DisplayPort
//!  ActuatorPort ◀──│  FSM · PID · Window · Debounce │ ──▶ EventSink
//!                  └─────────────────────────────┘ ◀─▶ ProfileStore
//! ```
//!
//! ## Tick order
//!
//! Each tick runs, in a fixed order: sensor sampling and fault detection,
//! telemetry, display, the state table, event-driven cross-cutting
//! transitions (cancel / profile select), the debounce filter, and finally
//! PID + relay window. Fault detection must precede the state table so the
//! Error override preempts whatever the table would have done; an event
//! produced by the debouncer is consumed on the *next* tick.
//!
//! Every periodic deadline advances by `deadline += period` rather than
//! `now + period`, so a late pass causes bounded drift, never a burst of
//! catch-up work.

use log::warn;

use crate::drivers::switches::{SwitchDebouncer, SwitchEvent};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, OvenState, OvenStatus};
use crate::config::OvenConfig;
use crate::profile::Profile;

use super::events::{quantize_plot_row, AppEvent, ControlSample, DisplayFrame};
use super::ports::{
    ActuatorPort, DisplayPort, EventSink, ProfileStore, SensorPort, TelemetrySink,
};

// ───────────────────────────────────────────────────────────────
// Profile restore
// ───────────────────────────────────────────────────────────────

/// Restore the persisted profile at boot.
///
/// An unreadable or invalid selection silently falls back to lead-free, and
/// the default is written back so the next boot reads a valid id.
pub fn restore_profile(store: &mut impl ProfileStore) -> Profile {
    match store.load() {
        Ok(p) => p,
        Err(e) => {
            warn!("profile restore failed ({e}), defaulting to lead-free");
            let p = Profile::LeadFree;
            if let Err(e) = store.save(p) {
                warn!("profile default save failed: {e}");
            }
            p
        }
    }
}

// ───────────────────────────────────────────────────────────────
// OvenService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct OvenService {
    fsm: Fsm,
    ctx: FsmContext,
    debouncer: SwitchDebouncer,

    // Independent periodic deadlines (milliseconds, monotonic).
    next_read_ms: u64,
    next_check_ms: u64,
    next_display_ms: u64,

    /// Seconds since the current run started (telemetry timestamp).
    timer_seconds: u32,
    /// Last second a plot sample was taken, to fire once per cadence tick.
    last_plot_secs: u32,
    /// Heartbeat LED level, toggled once per second while running.
    led_on: bool,
    /// Most recent PID output, reported in telemetry.
    last_output_ms: f32,
    /// Previous sample's fault mask, for clear-edge detection.
    prev_fault_bits: u8,
}

impl OvenService {
    /// Construct the service from configuration and the restored profile.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: OvenConfig, profile: Profile) -> Self {
        let debouncer = SwitchDebouncer::new(config.debounce_period_ms);
        let ctx = FsmContext::new(config, profile);
        let fsm = Fsm::new(build_state_table(), OvenState::Idle);
        Self {
            fsm,
            ctx,
            debouncer,
            next_read_ms: 0,
            next_check_ms: 0,
            next_display_ms: 0,
            timer_seconds: 0,
            last_plot_secs: 0,
            led_on: false,
            last_output_ms: 0.0,
            prev_fault_bits: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Anchor the periodic deadlines at `now_ms` and enter the initial state.
    pub fn start(&mut self, now_ms: u64, sink: &mut impl EventSink) {
        self.next_read_ms = now_ms;
        self.next_check_ms = now_ms;
        self.next_display_ms = now_ms;
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// `hw` satisfies **both** [`SensorPort`] and [`ActuatorPort`], and `io`
    /// bundles the three outbound sinks — this avoids a forest of mutable
    /// borrows while keeping each port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        store: &mut impl ProfileStore,
        io: &mut (impl TelemetrySink + DisplayPort + EventSink),
    ) {
        self.ctx.now_ms = now_ms;
        let prev_state = self.fsm.current_state();

        // 1. Thermocouple sampling and fault detection. Runs before the
        //    state table so a fault preempts this tick's transition.
        if now_ms > self.next_read_ms {
            self.next_read_ms += u64::from(self.ctx.config.sensor_sampling_ms);
            let reading = hw.read_thermocouple();
            self.ctx.input_c = reading.celsius;
            self.ctx.fault_bits = reading.fault_bits;

            if self.ctx.has_faults() {
                if self.fsm.current_state() != OvenState::Error {
                    io.emit(&AppEvent::FaultDetected(reading.fault_bits));
                    self.fsm.force_transition(OvenState::Error, &mut self.ctx);
                }
            } else if self.prev_fault_bits != 0 {
                io.emit(&AppEvent::FaultCleared);
            }
            self.prev_fault_bits = reading.fault_bits;
        }

        // 2. Telemetry record and heartbeat, once per second while running.
        if now_ms > self.next_check_ms {
            self.next_check_ms += u64::from(self.ctx.config.sensor_sampling_ms);
            if self.ctx.status == OvenStatus::On {
                self.led_on = !self.led_on;
                self.timer_seconds += 1;
                io.sample(&ControlSample {
                    elapsed_secs: self.timer_seconds,
                    setpoint_c: self.ctx.setpoint_c,
                    input_c: self.ctx.input_c,
                    output_ms: self.last_output_ms,
                });
            } else {
                self.led_on = false;
            }
            hw.set_status_led(self.led_on);
        }

        // 3. Display refresh.
        if now_ms > self.next_display_ms {
            self.next_display_ms += u64::from(self.ctx.config.display_refresh_ms);
            io.update(&self.build_frame());
        }

        // 4. The state table.
        self.fsm.tick(&mut self.ctx);

        // Run-start bookkeeping (set by the Idle handler this tick).
        if self.ctx.take_run_started() {
            self.timer_seconds = 0;
            self.last_plot_secs = 0;
            io.run_header();
            io.emit(&AppEvent::RunStarted(self.ctx.profile));
        }

        // 5. Event-driven cross-cutting transitions. Any event still pending
        //    here was not consumed by the state table.
        if let Some(event) = self.ctx.switch_event.take() {
            match event {
                SwitchEvent::StartStop => {
                    // While running, the start/stop switch means cancel.
                    if self.ctx.status == OvenStatus::On {
                        self.ctx.status = OvenStatus::Off;
                        self.fsm.force_transition(OvenState::Idle, &mut self.ctx);
                    }
                }
                SwitchEvent::ProfileSelect => {
                    // Selection is only honoured while idle.
                    if self.fsm.current_state() == OvenState::Idle {
                        let next = self.ctx.profile.next();
                        self.ctx.profile = next;
                        // Fire-and-forget: a failed write must not block.
                        if let Err(e) = store.save(next) {
                            warn!("profile save failed: {e}");
                        }
                        io.emit(&AppEvent::ProfileSelected(next));
                    }
                }
            }
        }

        // 6. Debounce filter advance. An event confirmed now is consumed by
        //    steps 4/5 of the next tick.
        let raw = hw.read_switches();
        if let Some(event) = self.debouncer.tick(raw, now_ms) {
            self.ctx.switch_event = Some(event);
        }

        // 7. PID compute and relay window. Status Off forces the heater off
        //    regardless of window state.
        if self.ctx.status == OvenStatus::On {
            self.last_output_ms =
                self.ctx
                    .pid
                    .compute(now_ms, self.ctx.setpoint_c, self.ctx.input_c);
            let heat = self.ctx.window.tick(now_ms, self.last_output_ms);
            hw.set_heater(heat);
        } else {
            hw.set_heater(false);
        }
        hw.set_buzzer(self.ctx.buzzer);

        let new_state = self.fsm.current_state();
        if new_state != prev_state {
            io.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current sequencer state.
    pub fn state(&self) -> OvenState {
        self.fsm.current_state()
    }

    /// Current heat-process status.
    pub fn status(&self) -> OvenStatus {
        self.ctx.status
    }

    /// Currently selected profile.
    pub fn profile(&self) -> Profile {
        self.ctx.profile
    }

    /// Commanded setpoint (°C).
    pub fn setpoint_c(&self) -> f32 {
        self.ctx.setpoint_c
    }

    /// Latest measured temperature (°C).
    pub fn input_c(&self) -> f32 {
        self.ctx.input_c
    }

    /// Active fault bitmask (0 = healthy).
    pub fn fault_bits(&self) -> u8 {
        self.ctx.fault_bits
    }

    /// Most recent PID output (ms of on-time per window).
    pub fn last_output_ms(&self) -> f32 {
        self.last_output_ms
    }

    // ── Internal ──────────────────────────────────────────────

    fn build_frame(&mut self) -> DisplayFrame {
        let state = self.fsm.current_state();
        let plot_sample = if self.ctx.status == OvenStatus::On
            && self.timer_seconds > self.last_plot_secs
            && self.timer_seconds % self.ctx.config.plot_sample_secs == 0
        {
            self.last_plot_secs = self.timer_seconds;
            Some(quantize_plot_row(self.ctx.input_c))
        } else {
            None
        };
        DisplayFrame {
            state,
            profile: self.ctx.profile,
            reading_c: (state != OvenState::Error).then_some(self.ctx.input_c),
            plot_sample,
        }
    }
}

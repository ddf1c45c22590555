//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single aggregate the sequencer reads from and writes
//! to: the latest thermocouple sample, the commanded setpoint, stage timers,
//! the PID controller and relay window, and the pending debounced switch
//! event. It is owned by the control loop and never touched from anywhere
//! else, so no locking is needed.

use crate::config::OvenConfig;
use crate::control::pid::{PidController, PidMode, Stage};
use crate::control::window::RelayWindow;
use crate::drivers::switches::SwitchEvent;
use crate::fsm::OvenStatus;
use crate::profile::Profile;

/// The shared context passed to every state handler function.
#[derive(Debug, Clone)]
pub struct FsmContext {
    // -- Timing --
    /// Monotonic time of the current tick (milliseconds).
    pub now_ms: u64,

    // -- Sensor data --
    /// Latest thermocouple temperature (°C). Updated once per sample period.
    pub input_c: f32,
    /// Latest fault bitmask. Non-zero means the sensor is unusable.
    pub fault_bits: u8,

    // -- Process state --
    /// Heat-process status; gates the relay and heartbeat outputs.
    pub status: OvenStatus,
    /// Commanded temperature (°C) for the current stage.
    pub setpoint_c: f32,
    /// Currently selected profile.
    pub profile: Profile,

    // -- Active profile constants (loaded at run start) --
    pub soak_max_c: f32,
    pub reflow_max_c: f32,
    pub soak_micro_period_ms: u32,

    // -- Stage timers --
    /// Deadline for the next soak staircase step.
    pub soak_deadline_ms: u64,
    /// Deadline for silencing the completion beep.
    pub beep_deadline_ms: u64,

    // -- Events --
    /// Pending debounced switch event; consumed at most once per tick.
    pub switch_event: Option<SwitchEvent>,
    /// Set by the Idle handler when a run begins; taken by the service to
    /// emit the telemetry header and reset run-scoped counters.
    pub run_started: bool,

    // -- Outputs --
    /// Completion buzzer command.
    pub buzzer: bool,

    // -- Control --
    pub pid: PidController,
    pub window: RelayWindow,

    // -- Configuration --
    pub config: OvenConfig,
}

impl FsmContext {
    /// Create a new context with the given configuration and the profile
    /// restored from storage.
    pub fn new(config: OvenConfig, profile: Profile) -> Self {
        let pid = PidController::new(
            config.gains(Stage::Preheat),
            config.pid_sample_ms,
            config.window_size_ms as f32,
        );
        let window = RelayWindow::new(config.window_size_ms);
        Self {
            now_ms: 0,
            input_c: 0.0,
            fault_bits: 0,
            status: OvenStatus::Off,
            setpoint_c: 0.0,
            profile,
            soak_max_c: 0.0,
            reflow_max_c: 0.0,
            soak_micro_period_ms: 0,
            soak_deadline_ms: 0,
            beep_deadline_ms: 0,
            switch_event: None,
            run_started: false,
            buzzer: false,
            pid,
            window,
            config,
        }
    }

    /// Returns `true` if any sensor fault is active.
    pub fn has_faults(&self) -> bool {
        self.fault_bits != 0
    }

    /// Consume a pending start/stop press, if any.
    pub fn take_start_event(&mut self) -> bool {
        if self.switch_event == Some(SwitchEvent::StartStop) {
            self.switch_event = None;
            true
        } else {
            false
        }
    }

    /// Take the run-started flag set by the Idle handler this tick.
    pub fn take_run_started(&mut self) -> bool {
        core::mem::take(&mut self.run_started)
    }

    /// Install the gain set for `stage` on the PID controller.
    pub fn retune(&mut self, stage: Stage) {
        let gains = self.config.gains(stage);
        self.pid.set_tunings(gains);
    }

    /// Arm the controls for a new run. Called from the Idle handler on a
    /// confirmed start press, before transitioning to Preheat or Bake.
    pub fn begin_run(&mut self) {
        self.window.restart(self.now_ms);
        if self.config.reset_pid_on_start {
            self.pid.reset();
        }
        self.pid
            .set_output_limits(0.0, self.config.window_size_ms as f32);
        self.pid.set_sample_time(self.config.pid_sample_ms);

        if let Some(params) = self.profile.params() {
            self.soak_max_c = params.soak_max_c;
            self.reflow_max_c = params.reflow_max_c;
            self.soak_micro_period_ms = params.soak_micro_period_ms;
            self.setpoint_c = self.config.soak_min_c;
            self.retune(Stage::Preheat);
        } else {
            self.setpoint_c = self.config.bake_temp_c;
            self.retune(Stage::Bake);
        }

        self.pid.set_mode(PidMode::Automatic, self.input_c);
        self.run_started = true;
    }
}

//! PID controller for the oven heater.
//!
//! Proportional-integral-derivative controller with a fixed internal sample
//! period: `compute` may be called every loop pass, but the output only
//! changes once per sample interval and is held in between. Derivative acts
//! on the measurement (not the error) so setpoint steps — which the soak
//! staircase produces every few seconds — do not kick the output.
//!
//! Gains are retuned wholesale on stage transitions; a retune between
//! samples takes effect on the next computed sample, never mid-sample.

use serde::{Deserialize, Serialize};

/// One complete set of PID gains. Swapped atomically per stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSet {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Process stage a gain set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preheat,
    Soak,
    Reflow,
    Bake,
}

/// Controller mode. `Manual` holds the last output and does no computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidMode {
    Manual,
    Automatic,
}

/// PID controller with sample-period gating and output clamping.
#[derive(Debug, Clone)]
pub struct PidController {
    // Working gains, pre-scaled by the sample period (ki * ts, kd / ts) so
    // the inner loop is a plain multiply-accumulate.
    kp: f32,
    ki: f32,
    kd: f32,
    /// Unscaled gains as last supplied, for rescaling on sample-time change.
    gains: GainSet,
    sample_ms: u32,
    out_min: f32,
    out_max: f32,
    mode: PidMode,
    i_term: f32,
    last_input: f32,
    last_output: f32,
    last_time_ms: Option<u64>,
}

impl PidController {
    /// Construct in `Manual` mode with output limits `[0, out_max]`.
    pub fn new(gains: GainSet, sample_ms: u32, out_max: f32) -> Self {
        let mut pid = Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            gains,
            sample_ms,
            out_min: 0.0,
            out_max,
            mode: PidMode::Manual,
            i_term: 0.0,
            last_input: 0.0,
            last_output: 0.0,
            last_time_ms: None,
        };
        pid.set_tunings(gains);
        pid
    }

    /// Install a new gain set. Takes effect on the next computed sample.
    pub fn set_tunings(&mut self, gains: GainSet) {
        let ts = self.sample_ms as f32 / 1000.0;
        self.gains = gains;
        self.kp = gains.kp;
        self.ki = gains.ki * ts;
        self.kd = gains.kd / ts;
    }

    /// Gains as last supplied.
    pub fn tunings(&self) -> GainSet {
        self.gains
    }

    /// Change the sample period, rescaling the time-dependent gains.
    pub fn set_sample_time(&mut self, sample_ms: u32) {
        if sample_ms == 0 || sample_ms == self.sample_ms {
            return;
        }
        let ratio = sample_ms as f32 / self.sample_ms as f32;
        self.ki *= ratio;
        self.kd /= ratio;
        self.sample_ms = sample_ms;
    }

    /// Clamp the output (and accumulated state) to `[min, max]`.
    pub fn set_output_limits(&mut self, min: f32, max: f32) {
        if min >= max {
            return;
        }
        self.out_min = min;
        self.out_max = max;
        self.i_term = self.i_term.clamp(min, max);
        self.last_output = self.last_output.clamp(min, max);
    }

    /// Switch between `Manual` and `Automatic`.
    ///
    /// The Manual→Automatic edge re-initialises the derivative reference and
    /// seeds the integral from the held output, so engagement is bumpless.
    /// Re-entering `Automatic` while already automatic is a no-op — the
    /// integral accumulator deliberately survives across runs (see
    /// `OvenConfig::reset_pid_on_start`).
    pub fn set_mode(&mut self, mode: PidMode, current_input: f32) {
        if mode == PidMode::Automatic && self.mode == PidMode::Manual {
            self.last_input = current_input;
            self.i_term = self.last_output.clamp(self.out_min, self.out_max);
        }
        self.mode = mode;
    }

    pub fn mode(&self) -> PidMode {
        self.mode
    }

    /// Clear the integral accumulator and held output.
    pub fn reset(&mut self) {
        self.i_term = 0.0;
        self.last_output = 0.0;
        self.last_time_ms = None;
    }

    /// Compute (or hold) the control output for the current tick.
    ///
    /// Returns a value in `[out_min, out_max]`. Between sample boundaries,
    /// and in `Manual` mode, the previously computed output is returned
    /// unchanged.
    pub fn compute(&mut self, now_ms: u64, setpoint: f32, input: f32) -> f32 {
        if self.mode == PidMode::Manual {
            return self.last_output;
        }
        let due = match self.last_time_ms {
            None => true,
            Some(t) => now_ms.saturating_sub(t) >= u64::from(self.sample_ms),
        };
        if !due {
            return self.last_output;
        }

        let error = setpoint - input;
        self.i_term = (self.i_term + self.ki * error).clamp(self.out_min, self.out_max);
        let d_input = input - self.last_input;
        let output = (self.kp * error + self.i_term - self.kd * d_input)
            .clamp(self.out_min, self.out_max);

        self.last_input = input;
        self.last_output = output;
        self.last_time_ms = Some(now_ms);
        output
    }

    /// Most recently computed output.
    pub fn last_output(&self) -> f32 {
        self.last_output
    }
}

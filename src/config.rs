//! System configuration parameters
//!
//! All tunable parameters for the oven controller. Defaults reproduce the
//! stock lead-free/leaded curves; values can be overridden via NVS.

use serde::{Deserialize, Serialize};

use crate::control::pid::{GainSet, Stage};

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvenConfig {
    // --- Temperature thresholds (°C) ---
    /// Above this the oven is considered too hot to start a run.
    pub room_temp_c: f32,
    /// Preheat target; the soak staircase starts from here.
    pub soak_min_c: f32,
    /// Cooling target; dropping below this completes the run.
    pub cool_min_c: f32,
    /// Soak staircase increment per micro-period.
    pub soak_step_c: f32,
    /// How far below the reflow peak the cool-down is initiated.
    pub reflow_margin_c: f32,
    /// Bake hold temperature.
    pub bake_temp_c: f32,

    // --- Timing ---
    /// Time-proportioning relay window (milliseconds).
    pub window_size_ms: u32,
    /// Thermocouple sampling period (milliseconds).
    pub sensor_sampling_ms: u32,
    /// PID computation period (milliseconds).
    pub pid_sample_ms: u32,
    /// Display refresh period (milliseconds).
    pub display_refresh_ms: u32,
    /// Scroll-plot sample cadence (seconds).
    pub plot_sample_secs: u32,
    /// Minimum stable period before a switch press is accepted (milliseconds).
    pub debounce_period_ms: u32,
    /// Completion beep duration (milliseconds).
    pub complete_beep_ms: u32,

    // --- PID gains per stage ---
    pub preheat_gains: GainSet,
    pub soak_gains: GainSet,
    pub reflow_gains: GainSet,
    pub bake_gains: GainSet,

    /// Clear the PID integral accumulator when a new run starts.
    ///
    /// Historically the accumulator carried over between runs, which smooths
    /// back-to-back runs on a still-warm oven but can overshoot on a cold
    /// one. Kept switchable rather than silently changed.
    pub reset_pid_on_start: bool,
}

impl Default for OvenConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            room_temp_c: 50.0,
            soak_min_c: 150.0,
            cool_min_c: 100.0,
            soak_step_c: 5.0,
            reflow_margin_c: 5.0,
            bake_temp_c: 120.0,

            // Timing
            window_size_ms: 2_000,
            sensor_sampling_ms: 1_000,
            pid_sample_ms: 1_000,
            display_refresh_ms: 100,
            plot_sample_secs: 3,
            debounce_period_ms: 100,
            complete_beep_ms: 1_000,

            // Gains: preheat is gentle, soak damps the staircase, reflow is
            // aggressive for the final ramp, bake holds a low plateau.
            preheat_gains: GainSet {
                kp: 100.0,
                ki: 0.025,
                kd: 20.0,
            },
            soak_gains: GainSet {
                kp: 300.0,
                ki: 0.05,
                kd: 250.0,
            },
            reflow_gains: GainSet {
                kp: 300.0,
                ki: 0.05,
                kd: 350.0,
            },
            bake_gains: GainSet {
                kp: 100.0,
                ki: 0.07,
                kd: 20.0,
            },

            reset_pid_on_start: false,
        }
    }
}

impl OvenConfig {
    /// The gain set the sequencer installs when entering `stage`.
    pub fn gains(&self, stage: Stage) -> GainSet {
        match stage {
            Stage::Preheat => self.preheat_gains,
            Stage::Soak => self.soak_gains,
            Stage::Reflow => self.reflow_gains,
            Stage::Bake => self.bake_gains,
        }
    }
}

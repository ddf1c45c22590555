//! Outbound application events and sink payloads.
//!
//! The [`OvenService`](super::service::OvenService) emits these through the
//! [`EventSink`](super::ports::EventSink), [`TelemetrySink`](super::ports::TelemetrySink)
//! and [`DisplayPort`](super::ports::DisplayPort) ports. Adapters on the
//! other side decide what to do with them.

use crate::fsm::OvenState;
use crate::profile::Profile;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(OvenState),

    /// The sequencer transitioned between states.
    StateChanged { from: OvenState, to: OvenState },

    /// A run began with the given profile.
    RunStarted(Profile),

    /// One or more sensor faults were raised.
    FaultDetected(u8),

    /// All sensor faults have cleared.
    FaultCleared,

    /// The operator cycled the profile selection.
    ProfileSelected(Profile),
}

/// One control-loop sample, emitted per second while a run is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSample {
    /// Seconds since the run started.
    pub elapsed_secs: u32,
    /// Commanded temperature (°C).
    pub setpoint_c: f32,
    /// Measured temperature (°C).
    pub input_c: f32,
    /// PID output (milliseconds of relay on-time per window).
    pub output_ms: f32,
}

/// Everything the front panel needs for one refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFrame {
    /// Current process state; the adapter renders `state.label()`.
    pub state: OvenState,
    /// Active profile; the adapter renders `profile.abbrev()`.
    pub profile: Profile,
    /// Measured temperature, or `None` when the sensor is faulted and the
    /// adapter should show an error indicator instead.
    pub reading_c: Option<f32>,
    /// Quantized scroll-plot sample (pixel row), present on the refreshes
    /// where the plot cadence fired.
    pub plot_sample: Option<u8>,
}

// ── Scroll-plot geometry ──────────────────────────────────────
//
// The plot occupies the display to the right of the temperature axis; its
// ring buffer capacity equals the plot's pixel width, so one sample maps to
// one column.

/// Plot width in pixels (128-px panel minus the 18-px axis gutter).
pub const PLOT_WIDTH: usize = 110;
/// Pixel row corresponding to full scale.
pub const PLOT_TOP_ROW: u8 = 19;
/// Pixel row corresponding to 0 °C (the time axis).
pub const PLOT_BOTTOM_ROW: u8 = 63;
/// Temperature mapped to [`PLOT_TOP_ROW`].
pub const PLOT_FULL_SCALE_C: f32 = 250.0;

/// Quantize a temperature into a plot pixel row (lower row = hotter).
pub fn quantize_plot_row(input_c: f32) -> u8 {
    let span = f32::from(PLOT_BOTTOM_ROW - PLOT_TOP_ROW);
    let row = f32::from(PLOT_BOTTOM_ROW) - input_c * span / PLOT_FULL_SCALE_C;
    row.clamp(f32::from(PLOT_TOP_ROW), f32::from(PLOT_BOTTOM_ROW)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantization_maps_scale_to_plot_rows() {
        assert_eq!(quantize_plot_row(0.0), PLOT_BOTTOM_ROW);
        assert_eq!(quantize_plot_row(250.0), PLOT_TOP_ROW);
        // 125 °C lands mid-plot.
        assert_eq!(quantize_plot_row(125.0), 41);
        // Out-of-scale readings clamp instead of wrapping.
        assert_eq!(quantize_plot_row(300.0), PLOT_TOP_ROW);
        assert_eq!(quantize_plot_row(-10.0), PLOT_BOTTOM_ROW);
    }
}

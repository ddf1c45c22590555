//! Serial telemetry adapter.
//!
//! Streams the reflow curve as CSV over the USB-CDC console so a connected
//! host can log or plot it:
//!
//! ```text
//! Time,Setpoint,Input,Output
//! 1,150.00,26.54,1620.00
//! 2,150.00,27.91,1580.00
//! ```
//!
//! On ESP-IDF, stdout is routed to the UART/USB console by the runtime, so
//! plain `println!` is the wire format.

use crate::app::events::ControlSample;
use crate::app::ports::TelemetrySink;

/// CSV-over-serial telemetry sink.
pub struct SerialTelemetry;

impl SerialTelemetry {
    pub fn new() -> Self {
        Self
    }
}

impl TelemetrySink for SerialTelemetry {
    fn run_header(&mut self) {
        println!("Time,Setpoint,Input,Output");
    }

    fn sample(&mut self, sample: &ControlSample) {
        println!(
            "{},{:.2},{:.2},{:.2}",
            sample.elapsed_secs, sample.setpoint_c, sample.input_c, sample.output_ms
        );
    }
}

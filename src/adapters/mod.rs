//! Driven adapters: everything on the outside of the port boundary.

pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod serial;
pub mod time;

use crate::app::events::{AppEvent, ControlSample, DisplayFrame};
use crate::app::ports::{DisplayPort, EventSink, TelemetrySink};

/// Bundles the three outbound sinks into the single `io` argument
/// [`OvenService::tick`](crate::app::service::OvenService::tick) expects.
pub struct IoBundle<T, D, E> {
    pub telemetry: T,
    pub display: D,
    pub events: E,
}

impl<T: TelemetrySink, D, E> TelemetrySink for IoBundle<T, D, E> {
    fn run_header(&mut self) {
        self.telemetry.run_header();
    }

    fn sample(&mut self, sample: &ControlSample) {
        self.telemetry.sample(sample);
    }
}

impl<T, D: DisplayPort, E> DisplayPort for IoBundle<T, D, E> {
    fn update(&mut self, frame: &DisplayFrame) {
        self.display.update(frame);
    }
}

impl<T, D, E: EventSink> EventSink for IoBundle<T, D, E> {
    fn emit(&mut self, event: &AppEvent) {
        self.events.emit(event);
    }
}

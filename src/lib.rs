//! OvenPilot firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module, so the entire control
//! stack — sequencer, PID, relay window, debounce, persistence — builds and
//! runs on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod fsm;
pub mod profile;

pub mod adapters;
pub mod drivers;
pub mod sensors;

//! Hardware adapter — bridges real peripherals to the domain port traits.
//!
//! Owns the thermocouple front end and the three output pins, exposing them
//! through [`SensorPort`] and [`ActuatorPort`]. This is the only module in
//! the system that touches actual hardware.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives GPIO pin drivers and the MAX31856 over SPI.
//! On host/test: outputs are tracked in-memory and the switch reading comes
//! from an injectable static, so the full control loop runs in simulation.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::switches::RawSwitch;
use crate::sensors::thermocouple::Max31856;
use crate::sensors::ThermocoupleReading;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU8, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, Input, Output, PinDriver};

// ── Host simulation injection point ───────────────────────────

// 0 = none, 1 = start/stop held, 2 = profile-select held.
#[cfg(not(target_os = "espidf"))]
static SIM_SWITCH: AtomicU8 = AtomicU8::new(0);

/// Inject the simulated switch level (host/test builds only). The raw level
/// is held until changed, exactly like a finger on the real switch.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_switch(raw: Option<RawSwitch>) {
    let v = match raw {
        None => 0,
        Some(RawSwitch::StartStop) => 1,
        Some(RawSwitch::ProfileSelect) => 2,
    };
    SIM_SWITCH.store(v, Ordering::Relaxed);
}

// ── Adapter ───────────────────────────────────────────────────

/// Concrete adapter that combines all hardware behind the port traits.
pub struct HardwareAdapter {
    tc: Max31856,
    #[cfg(target_os = "espidf")]
    ssr: PinDriver<'static, AnyOutputPin, Output>,
    #[cfg(target_os = "espidf")]
    buzzer: PinDriver<'static, AnyOutputPin, Output>,
    #[cfg(target_os = "espidf")]
    led: PinDriver<'static, AnyOutputPin, Output>,
    #[cfg(target_os = "espidf")]
    sw_start: PinDriver<'static, AnyIOPin, Input>,
    #[cfg(target_os = "espidf")]
    sw_select: PinDriver<'static, AnyIOPin, Input>,

    #[cfg(not(target_os = "espidf"))]
    heater_on: bool,
    #[cfg(not(target_os = "espidf"))]
    buzzer_on: bool,
    #[cfg(not(target_os = "espidf"))]
    led_on: bool,
}

#[cfg(target_os = "espidf")]
impl HardwareAdapter {
    pub fn new(
        tc: Max31856,
        ssr: PinDriver<'static, AnyOutputPin, Output>,
        buzzer: PinDriver<'static, AnyOutputPin, Output>,
        led: PinDriver<'static, AnyOutputPin, Output>,
        sw_start: PinDriver<'static, AnyIOPin, Input>,
        sw_select: PinDriver<'static, AnyIOPin, Input>,
    ) -> Self {
        Self {
            tc,
            ssr,
            buzzer,
            led,
            sw_start,
            sw_select,
        }
    }

    fn drive(pin: &mut PinDriver<'static, AnyOutputPin, Output>, on: bool) {
        let result = if on { pin.set_high() } else { pin.set_low() };
        if let Err(e) = result {
            log::warn!("GPIO write failed: {e}");
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl HardwareAdapter {
    pub fn new(tc: Max31856) -> Self {
        Self {
            tc,
            heater_on: false,
            buzzer_on: false,
            led_on: false,
        }
    }

    pub fn heater_on(&self) -> bool {
        self.heater_on
    }

    pub fn buzzer_on(&self) -> bool {
        self.buzzer_on
    }

    pub fn led_on(&self) -> bool {
        self.led_on
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_thermocouple(&mut self) -> ThermocoupleReading {
        self.tc.read()
    }

    #[cfg(target_os = "espidf")]
    fn read_switches(&mut self) -> Option<RawSwitch> {
        // Active low: a pressed switch pulls its line to ground. Start/stop
        // wins when both are somehow down, matching its higher priority.
        if self.sw_start.is_low() {
            return Some(RawSwitch::StartStop);
        }
        if self.sw_select.is_low() {
            return Some(RawSwitch::ProfileSelect);
        }
        None
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_switches(&mut self) -> Option<RawSwitch> {
        match SIM_SWITCH.load(Ordering::Relaxed) {
            1 => Some(RawSwitch::StartStop),
            2 => Some(RawSwitch::ProfileSelect),
            _ => None,
        }
    }
}

// ── ActuatorPort implementation ───────────────────────────────

#[cfg(target_os = "espidf")]
impl ActuatorPort for HardwareAdapter {
    fn set_heater(&mut self, on: bool) {
        Self::drive(&mut self.ssr, on);
    }

    fn set_buzzer(&mut self, on: bool) {
        Self::drive(&mut self.buzzer, on);
    }

    fn set_status_led(&mut self, on: bool) {
        Self::drive(&mut self.led, on);
    }

    fn all_off(&mut self) {
        self.set_heater(false);
        self.set_buzzer(false);
        self.set_status_led(false);
    }
}

#[cfg(not(target_os = "espidf"))]
impl ActuatorPort for HardwareAdapter {
    fn set_heater(&mut self, on: bool) {
        self.heater_on = on;
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer_on = on;
    }

    fn set_status_led(&mut self, on: bool) {
        self.led_on = on;
    }

    fn all_off(&mut self) {
        self.heater_on = false;
        self.buzzer_on = false;
        self.led_on = false;
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn sim_switch_level_is_held_until_changed() {
        let mut hw = HardwareAdapter::new(Max31856::new());
        sim_set_switch(Some(RawSwitch::ProfileSelect));
        assert_eq!(hw.read_switches(), Some(RawSwitch::ProfileSelect));
        assert_eq!(hw.read_switches(), Some(RawSwitch::ProfileSelect));
        sim_set_switch(None);
        assert_eq!(hw.read_switches(), None);
    }

    #[test]
    fn all_off_clears_every_output() {
        let mut hw = HardwareAdapter::new(Max31856::new());
        hw.set_heater(true);
        hw.set_buzzer(true);
        hw.set_status_led(true);
        hw.all_off();
        assert!(!hw.heater_on() && !hw.buzzer_on() && !hw.led_on());
    }
}

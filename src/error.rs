//! Unified error types for the OvenPilot firmware.
//!
//! Follows embedded best practice: a single `Error` enum that every subsystem
//! can convert into, keeping the top-level control loop's error handling
//! uniform. All variants are `Copy` so they can be cheaply passed through the
//! sequencer without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The thermocouple reported one or more fault conditions.
    Sensor(u8),
    /// Persistent storage could not be read or written.
    Store(crate::app::ports::StoreError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(bits) => write!(f, "sensor fault: {}", describe_faults(*bits)),
            Self::Store(e) => write!(f, "store: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Thermocouple fault categories
// ---------------------------------------------------------------------------

/// The eight fault conditions a MAX31856 can flag, in register bit order.
///
/// Any set bit makes the sensor unusable for control purposes; the sequencer
/// makes no distinction between kinds. The categories are kept apart only so
/// the operator can read *why* on the display/serial log. Faults are
/// level-triggered: each sample re-reads the register, and the Error state
/// clears as soon as the register reads zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorFault {
    /// Thermocouple open circuit (broken or disconnected wire).
    OpenCircuit = 0b0000_0001,
    /// Over/under-voltage on the thermocouple inputs.
    OverUnderVoltage = 0b0000_0010,
    /// Thermocouple temperature below the low threshold.
    TcLow = 0b0000_0100,
    /// Thermocouple temperature above the high threshold.
    TcHigh = 0b0000_1000,
    /// Cold-junction temperature below the low threshold.
    CjLow = 0b0001_0000,
    /// Cold-junction temperature above the high threshold.
    CjHigh = 0b0010_0000,
    /// Thermocouple reading outside the conversion range.
    TcRange = 0b0100_0000,
    /// Cold-junction reading outside the conversion range.
    CjRange = 0b1000_0000,
}

impl SensorFault {
    /// All eight categories, LSB first.
    pub const ALL: [SensorFault; 8] = [
        Self::OpenCircuit,
        Self::OverUnderVoltage,
        Self::TcLow,
        Self::TcHigh,
        Self::CjLow,
        Self::CjHigh,
        Self::TcRange,
        Self::CjRange,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenCircuit => write!(f, "open circuit"),
            Self::OverUnderVoltage => write!(f, "over/under voltage"),
            Self::TcLow => write!(f, "TC low"),
            Self::TcHigh => write!(f, "TC high"),
            Self::CjLow => write!(f, "CJ low"),
            Self::CjHigh => write!(f, "CJ high"),
            Self::TcRange => write!(f, "TC out of range"),
            Self::CjRange => write!(f, "CJ out of range"),
        }
    }
}

/// Human-readable summary of a fault bitmask, e.g. `"open circuit+TC high"`.
pub fn describe_faults(bits: u8) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for fault in SensorFault::ALL {
        if bits & fault.mask() != 0 {
            if !out.is_empty() {
                let _ = out.push('+');
            }
            let _ = core::fmt::write(&mut out, format_args!("{fault}"));
        }
    }
    if out.is_empty() {
        let _ = out.push_str("none");
    }
    out
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_cover_all_eight_bits_exactly_once() {
        let mut seen = 0u8;
        for fault in SensorFault::ALL {
            assert_eq!(seen & fault.mask(), 0, "overlapping mask: {fault:?}");
            seen |= fault.mask();
        }
        assert_eq!(seen, 0xFF);
    }

    #[test]
    fn describe_names_every_set_bit() {
        let s = describe_faults(SensorFault::OpenCircuit.mask() | SensorFault::CjHigh.mask());
        assert_eq!(s.as_str(), "open circuit+CJ high");
        assert_eq!(describe_faults(0).as_str(), "none");
    }
}

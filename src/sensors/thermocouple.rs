//! MAX31856 K-type thermocouple front end.
//!
//! The MAX31856 performs cold-junction compensated conversion and exposes a
//! 19-bit signed temperature (0.0078125 °C/LSB) plus a fault status register
//! whose eight bits map one-to-one onto [`SensorFault`](crate::error::SensorFault).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the conversion and fault registers over SPI.
//! On host/test: reads from statics for injection, so the whole control
//! stack can be driven in simulation.

use crate::error::SensorFault;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

#[cfg(target_os = "espidf")]
use embedded_hal::spi::{Operation, SpiDevice};
#[cfg(target_os = "espidf")]
use esp_idf_hal::spi::SpiDeviceDriver;

// ── Register map (subset) ─────────────────────────────────────

#[cfg(target_os = "espidf")]
const REG_CR0: u8 = 0x00;
#[cfg(target_os = "espidf")]
const REG_CR1: u8 = 0x01;
#[cfg(target_os = "espidf")]
const REG_LTCBH: u8 = 0x0C;
#[cfg(target_os = "espidf")]
const REG_SR: u8 = 0x0F;

/// CR0: automatic conversion, 50/60 Hz filter default.
#[cfg(target_os = "espidf")]
const CR0_AUTOCONVERT: u8 = 0x80;
/// CR1: K-type thermocouple, 1-sample averaging.
#[cfg(target_os = "espidf")]
const CR1_TYPE_K: u8 = 0x03;

/// Degrees Celsius per LSB of the 19-bit linearized reading.
const LSB_CELSIUS: f32 = 0.007_812_5;

// ── Host simulation injection points ──────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_MILLI_C: AtomicI32 = AtomicI32::new(25_000);
#[cfg(not(target_os = "espidf"))]
static SIM_FAULT_BITS: AtomicU8 = AtomicU8::new(0);

/// Inject a simulated temperature (host/test builds only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_celsius(celsius: f32) {
    SIM_TEMP_MILLI_C.store((celsius * 1000.0) as i32, Ordering::Relaxed);
}

/// Inject simulated fault bits (host/test builds only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_faults(bits: u8) {
    SIM_FAULT_BITS.store(bits, Ordering::Relaxed);
}

// ── Reading ───────────────────────────────────────────────────

/// One thermocouple sample: temperature plus the raw fault bitmask.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThermocoupleReading {
    pub celsius: f32,
    /// Fault status register; non-zero means the sensor is unusable.
    pub fault_bits: u8,
}

impl ThermocoupleReading {
    pub fn is_faulted(&self) -> bool {
        self.fault_bits != 0
    }
}

// ── Conversion helpers (pure) ─────────────────────────────────

/// Decode the three linearized-temperature registers (LTCBH/M/L) into °C.
///
/// The 19-bit signed value sits in bits 23..5 of the 24-bit register block.
pub fn decode_temperature(regs: [u8; 3]) -> f32 {
    let raw24 =
        (i32::from(regs[0]) << 16) | (i32::from(regs[1]) << 8) | i32::from(regs[2]);
    // Sign-extend from bit 23, then drop the 5 unused low bits.
    let signed = (raw24 << 8) >> 8;
    (signed >> 5) as f32 * LSB_CELSIUS
}

/// Every status-register bit is a recognized fault category.
pub fn decode_faults(status: u8) -> u8 {
    let mut bits = 0;
    for fault in SensorFault::ALL {
        if status & fault.mask() != 0 {
            bits |= fault.mask();
        }
    }
    bits
}

// ── Driver ────────────────────────────────────────────────────

/// MAX31856 driver.
pub struct Max31856 {
    #[cfg(target_os = "espidf")]
    spi: SpiDeviceDriver<'static, esp_idf_hal::spi::SpiDriver<'static>>,
}

#[cfg(target_os = "espidf")]
impl Max31856 {
    /// Wrap an already-configured SPI device and program the chip for
    /// automatic K-type conversion.
    pub fn new(
        spi: SpiDeviceDriver<'static, esp_idf_hal::spi::SpiDriver<'static>>,
    ) -> Result<Self, esp_idf_sys::EspError> {
        let mut tc = Self { spi };
        tc.write_register(REG_CR0, CR0_AUTOCONVERT)?;
        tc.write_register(REG_CR1, CR1_TYPE_K)?;
        Ok(tc)
    }

    pub fn read(&mut self) -> ThermocoupleReading {
        let mut temp_regs = [0u8; 3];
        let mut status = [0u8; 1];
        // SPI errors surface as an open-circuit fault rather than a panic;
        // the sequencer treats them like any other sensor fault.
        if self.read_registers(REG_LTCBH, &mut temp_regs).is_err()
            || self.read_registers(REG_SR, &mut status).is_err()
        {
            return ThermocoupleReading {
                celsius: 0.0,
                fault_bits: SensorFault::OpenCircuit.mask(),
            };
        }
        ThermocoupleReading {
            celsius: decode_temperature(temp_regs),
            fault_bits: decode_faults(status[0]),
        }
    }

    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), esp_idf_sys::EspError> {
        let addr = [reg & 0x7F];
        self.spi
            .transaction(&mut [Operation::Write(&addr), Operation::Read(buf)])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), esp_idf_sys::EspError> {
        let frame = [reg | 0x80, value];
        SpiDevice::write(&mut self.spi, &frame)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Max31856 {
    pub fn new() -> Self {
        Self {}
    }

    /// Host build: returns whatever the simulation injected.
    pub fn read(&mut self) -> ThermocoupleReading {
        ThermocoupleReading {
            celsius: SIM_TEMP_MILLI_C.load(Ordering::Relaxed) as f32 / 1000.0,
            fault_bits: SIM_FAULT_BITS.load(Ordering::Relaxed),
        }
    }
}

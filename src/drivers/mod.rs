//! Driver seams for the peripherals around the control core
//!
//! The RTC and thermometer protocols sit on bus traits the AVR layer
//! bit-bangs; the touch pads and display are register-level. The core only
//! sees the traits below. The heater relay, serial port,
//! watchdog and EEPROM go through `embedded-hal` / `embedded-storage`.

pub mod dimmer;
pub mod ds1302;
pub mod ds18b20;
pub mod heater;
pub mod segment;

pub use dimmer::{Dimmer, FadeEngine, FadeHardware, FadeStatus};
pub use ds1302::{Ds1302, ThreeWire};
pub use ds18b20::{Ds18b20, OneWire};
pub use heater::Heater;
pub use segment::{Frame, Message};

use crate::aquarium::datetime::DateTime;

/// Battery-backed real-time clock with a small scratch RAM
pub trait Rtc {
    fn read_datetime(&mut self) -> DateTime;
    fn write_datetime(&mut self, datetime: &DateTime);
    /// Date-time of the last applied drift correction, kept in clock RAM
    fn read_scratch(&mut self) -> DateTime;
    fn write_scratch(&mut self, datetime: &DateTime);
}

/// Result of polling the water thermometer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reading {
    /// Conversion still running
    Busy,
    /// Bus fault or CRC mismatch
    Error,
    Celsius(i8),
}

pub trait Thermometer {
    /// Latest completed conversion; the driver schedules conversions itself
    fn read(&mut self) -> Reading;
    /// Power-cycle the sensor
    fn hard_reset(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sensor {
    /// Toggles the display or, together with Modify, cycles a mode
    Select,
    Modify,
}

pub trait TouchSensors {
    fn is_active(&mut self, sensor: Sensor) -> bool;
}

/// Four-digit seven-segment display, refreshed in the background
pub trait Display {
    fn show(&mut self, frame: &Frame);
}

//! DS18B20 water thermometer on a single 1-Wire drop
//!
//! Reads are non-blocking: each successful read collects the finished
//! conversion and immediately starts the next one, so the sensor is always
//! converting between polls.

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use log::warn;

use super::{Reading, Thermometer};

const SKIP_ROM: u8 = 0xCC;
const CONVERT_T: u8 = 0x44;
const READ_SCRATCHPAD: u8 = 0xBE;
const WRITE_SCRATCHPAD: u8 = 0x4E;

/// 9-bit conversions, about 94 ms each
pub const RESOLUTION_9_BIT: u8 = 0x1F;

pub const SCRATCHPAD_LEN: usize = 9;
const TEMP_LSB: usize = 0;
const TEMP_MSB: usize = 1;
const ALARM_HIGH: usize = 2;
const ALARM_LOW: usize = 3;
const CRC: usize = 8;

const POWER_CYCLE_MS: u8 = 10;

/// Bus primitives, timing-critical parts live in the implementation
pub trait OneWire {
    /// Reset pulse, true when a device answered with a presence pulse
    fn reset(&mut self) -> bool;
    fn write_byte(&mut self, byte: u8);
    fn read_byte(&mut self) -> u8;
    /// A converting sensor holds the line low
    fn line_is_high(&mut self) -> bool;
}

/// Dallas/Maxim CRC-8 (x^8 + x^5 + x^4 + 1, reflected)
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut byte = byte;
        for _ in 0..8 {
            let mix = (crc ^ byte) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            byte >>= 1;
        }
    }
    crc
}

/// Whole degrees from the 1/16 °C register, truncated toward zero
pub fn celsius(lsb: u8, msb: u8) -> i8 {
    (i16::from_le_bytes([lsb, msb]) / 16) as i8
}

pub struct Ds18b20<W, P, D> {
    bus: W,
    power: P,
    delay: D,
}

impl<W, P, D> Ds18b20<W, P, D>
where
    W: OneWire,
    P: OutputPin,
    D: DelayMs<u8>,
{
    pub fn new(bus: W, mut power: P, delay: D) -> Self {
        if power.set_high().is_err() {
            warn!("thermometer power pin fault");
        }
        Self { bus, power, delay }
    }

    /// Program the resolution and kick off a conversion
    fn start_conversion(&mut self, alarm_high: u8, alarm_low: u8) -> bool {
        if !self.bus.reset() {
            return false;
        }
        self.bus.write_byte(SKIP_ROM);
        self.bus.write_byte(WRITE_SCRATCHPAD);
        self.bus.write_byte(alarm_high);
        self.bus.write_byte(alarm_low);
        self.bus.write_byte(RESOLUTION_9_BIT);

        if !self.bus.reset() {
            return false;
        }
        self.bus.write_byte(SKIP_ROM);
        self.bus.write_byte(CONVERT_T);
        true
    }

    pub fn bus(&self) -> &W {
        &self.bus
    }
}

impl<W, P, D> Thermometer for Ds18b20<W, P, D>
where
    W: OneWire,
    P: OutputPin,
    D: DelayMs<u8>,
{
    fn read(&mut self) -> Reading {
        if !self.bus.line_is_high() {
            return Reading::Busy;
        }

        if !self.bus.reset() {
            return Reading::Error;
        }
        self.bus.write_byte(SKIP_ROM);
        self.bus.write_byte(READ_SCRATCHPAD);
        let mut pad = [0u8; SCRATCHPAD_LEN];
        for byte in pad.iter_mut() {
            *byte = self.bus.read_byte();
        }

        let reading = if crc8(&pad[..CRC]) == pad[CRC] {
            Reading::Celsius(celsius(pad[TEMP_LSB], pad[TEMP_MSB]))
        } else {
            Reading::Error
        };

        // Next conversion starts even after a bad read
        if !self.start_conversion(pad[ALARM_HIGH], pad[ALARM_LOW]) {
            return Reading::Error;
        }
        reading
    }

    fn hard_reset(&mut self) {
        if self.power.set_low().is_err() {
            warn!("thermometer power pin fault");
        }
        self.delay.delay_ms(POWER_CYCLE_MS);
        if self.power.set_high().is_err() {
            warn!("thermometer power pin fault");
        }
        self.delay.delay_ms(POWER_CYCLE_MS);
    }
}

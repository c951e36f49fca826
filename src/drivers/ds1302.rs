//! DS1302 trickle-charge timekeeper
//!
//! Registers are addressed one at a time over a three-wire bus, LSB first.
//! Even command bytes write, odd ones read. The clock RAM holds the
//! date-time of the last drift correction.

use super::Rtc;
use crate::aquarium::datetime::{DateTime, HourMode};

const SECONDS: u8 = 0x80;
const MINUTES: u8 = 0x82;
const HOURS: u8 = 0x84;
const DATE: u8 = 0x86;
const MONTH: u8 = 0x88;
const WEEKDAY: u8 = 0x8A;
const YEAR: u8 = 0x8C;
const WRITE_PROTECT: u8 = 0x8E;
const RAM: u8 = 0xC0;

const READ: u8 = 0x01;

// Hour register flags
const H12: u8 = 0b1000_0000;
const PM: u8 = 0b0010_0000;

/// Bytes of clock RAM the scratch date-time occupies
pub const SCRATCH_LEN: usize = 8;

/// Clocked serial link to the chip, the bus keeps CE high between calls
pub trait ThreeWire {
    fn write_byte(&mut self, byte: u8);
    fn read_byte(&mut self) -> u8;
    /// Drop CE and end the transfer
    fn finish(&mut self);
}

pub fn to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

pub fn from_bcd(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

pub fn decode_hour(raw: u8) -> (u8, HourMode) {
    if raw & H12 == 0 {
        return (from_bcd(raw & 0x3F), HourMode::H24);
    }
    let mode = if raw & PM != 0 { HourMode::Pm } else { HourMode::Am };
    (from_bcd(raw & 0x1F), mode)
}

pub fn encode_hour(hour: u8, mode: HourMode) -> u8 {
    match mode {
        HourMode::H24 => to_bcd(hour),
        HourMode::Am => H12 | to_bcd(hour),
        HourMode::Pm => H12 | PM | to_bcd(hour),
    }
}

fn mode_to_byte(mode: HourMode) -> u8 {
    match mode {
        HourMode::H24 => 0,
        HourMode::Am => 1,
        HourMode::Pm => 2,
    }
}

fn mode_from_byte(byte: u8) -> HourMode {
    match byte {
        1 => HourMode::Am,
        2 => HourMode::Pm,
        _ => HourMode::H24,
    }
}

pub fn scratch_bytes(datetime: &DateTime) -> [u8; SCRATCH_LEN] {
    [
        datetime.sec,
        datetime.min,
        datetime.hour,
        mode_to_byte(datetime.hour_mode),
        datetime.weekday,
        datetime.day,
        datetime.month,
        datetime.year,
    ]
}

pub fn scratch_from_bytes(bytes: &[u8; SCRATCH_LEN]) -> DateTime {
    DateTime {
        sec: bytes[0],
        min: bytes[1],
        hour: bytes[2],
        hour_mode: mode_from_byte(bytes[3]),
        weekday: bytes[4],
        day: bytes[5],
        month: bytes[6],
        year: bytes[7],
    }
}

pub struct Ds1302<W> {
    bus: W,
}

impl<W: ThreeWire> Ds1302<W> {
    pub fn new(bus: W) -> Self {
        Self { bus }
    }

    fn read_register(&mut self, address: u8) -> u8 {
        self.bus.write_byte(address | READ);
        let value = self.bus.read_byte();
        self.bus.finish();
        value
    }

    fn write_register(&mut self, address: u8, value: u8) {
        self.bus.write_byte(address);
        self.bus.write_byte(value);
        self.bus.finish();
    }

    fn unprotect(&mut self) {
        self.write_register(WRITE_PROTECT, 0x00);
    }

    pub fn bus(&self) -> &W {
        &self.bus
    }
}

impl<W: ThreeWire> Rtc for Ds1302<W> {
    fn read_datetime(&mut self) -> DateTime {
        let sec = from_bcd(self.read_register(SECONDS) & 0x7F);
        let min = from_bcd(self.read_register(MINUTES));
        let (hour, hour_mode) = decode_hour(self.read_register(HOURS));
        let day = from_bcd(self.read_register(DATE));
        let month = from_bcd(self.read_register(MONTH));
        let weekday = self.read_register(WEEKDAY);
        let year = from_bcd(self.read_register(YEAR));
        DateTime {
            sec,
            min,
            hour,
            hour_mode,
            weekday,
            day,
            month,
            year,
        }
    }

    fn write_datetime(&mut self, datetime: &DateTime) {
        self.unprotect();
        // Seconds first, bit 7 clear keeps the oscillator running
        self.write_register(SECONDS, to_bcd(datetime.sec));
        self.write_register(MINUTES, to_bcd(datetime.min));
        self.write_register(HOURS, encode_hour(datetime.hour, datetime.hour_mode));
        self.write_register(DATE, to_bcd(datetime.day));
        self.write_register(MONTH, to_bcd(datetime.month));
        self.write_register(WEEKDAY, datetime.weekday);
        self.write_register(YEAR, to_bcd(datetime.year));
    }

    fn read_scratch(&mut self) -> DateTime {
        let mut bytes = [0u8; SCRATCH_LEN];
        for (slot, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_register(RAM + 2 * slot as u8);
        }
        scratch_from_bytes(&bytes)
    }

    fn write_scratch(&mut self, datetime: &DateTime) {
        self.unprotect();
        for (slot, byte) in scratch_bytes(datetime).into_iter().enumerate() {
            self.write_register(RAM + 2 * slot as u8, byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Register file behind a byte-level bus
    struct FakeChip {
        registers: [u8; 256],
        command: Option<u8>,
        log: Vec<u8>,
    }

    impl Default for FakeChip {
        fn default() -> Self {
            Self {
                registers: [0; 256],
                command: None,
                log: Vec::new(),
            }
        }
    }

    impl ThreeWire for FakeChip {
        fn write_byte(&mut self, byte: u8) {
            match self.command.take() {
                None => self.command = Some(byte),
                Some(address) => {
                    self.registers[address as usize] = byte;
                    self.log.push(address);
                }
            }
        }

        fn read_byte(&mut self) -> u8 {
            let address = self.command.take().unwrap_or(0) & !READ;
            self.registers[address as usize]
        }

        fn finish(&mut self) {
            self.command = None;
        }
    }

    #[test]
    fn bcd_conversion() {
        assert_eq!(to_bcd(59), 0x59);
        assert_eq!(from_bcd(0x47), 47);
        assert_eq!(from_bcd(to_bcd(7)), 7);
    }

    #[test]
    fn twelve_hour_register() {
        assert_eq!(decode_hour(0x23), (23, HourMode::H24));
        assert_eq!(decode_hour(0b1010_0010), (2, HourMode::Pm));
        assert_eq!(decode_hour(0b1001_0001), (11, HourMode::Am));
        assert_eq!(encode_hour(2, HourMode::Pm), 0b1010_0010);
    }

    #[test]
    fn clock_registers_in_bcd() {
        let mut rtc = Ds1302::new(FakeChip::default());
        let datetime = DateTime {
            sec: 30,
            min: 15,
            hour: 21,
            hour_mode: HourMode::H24,
            weekday: 5,
            day: 31,
            month: 12,
            year: 25,
        };
        rtc.write_datetime(&datetime);

        let chip = rtc.bus();
        assert_eq!(chip.log[0], WRITE_PROTECT);
        assert_eq!(chip.registers[SECONDS as usize], 0x30);
        assert_eq!(chip.registers[HOURS as usize], 0x21);
        assert_eq!(chip.registers[YEAR as usize], 0x25);

        assert_eq!(rtc.read_datetime(), datetime);
    }

    #[test]
    fn halted_oscillator_flag_is_masked() {
        let mut chip = FakeChip::default();
        chip.registers[SECONDS as usize] = 0x80 | 0x12;
        let mut rtc = Ds1302::new(chip);
        assert_eq!(rtc.read_datetime().sec, 12);
    }

    #[test]
    fn scratch_lives_in_clock_ram() {
        let mut rtc = Ds1302::new(FakeChip::default());
        let mark = DateTime {
            sec: 0,
            min: 0,
            hour: 3,
            hour_mode: HourMode::H24,
            weekday: 1,
            day: 2,
            month: 3,
            year: 24,
        };
        rtc.write_scratch(&mark);
        assert_eq!(rtc.bus().registers[RAM as usize + 2 * 2], 3);
        assert_eq!(rtc.read_scratch(), mark);
    }
}

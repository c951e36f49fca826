//! Host-side fakes for the driver seams

use std::collections::VecDeque;
use std::vec::Vec;

use core::convert::Infallible;

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;
use embedded_hal_mock::delay::MockNoop;
use embedded_storage::{ReadStorage, Storage};

use crate::aquarium::datetime::DateTime;
use crate::aquarium::{Aquarium, Board, Peripherals};
use crate::drivers::{
    Display, FadeEngine, FadeHardware, Frame, Message, Reading, Rtc, Sensor, Thermometer,
    TouchSensors,
};
use crate::protocol::Buffered;

#[derive(Debug, Default)]
pub struct FakeRtc {
    pub now: DateTime,
    pub scratch: DateTime,
    /// Clock writes, scratch writes not counted
    pub writes: usize,
}

impl Rtc for FakeRtc {
    fn read_datetime(&mut self) -> DateTime {
        self.now
    }

    fn write_datetime(&mut self, datetime: &DateTime) {
        self.now = *datetime;
        self.writes += 1;
    }

    fn read_scratch(&mut self) -> DateTime {
        self.scratch
    }

    fn write_scratch(&mut self, datetime: &DateTime) {
        self.scratch = *datetime;
    }
}

#[derive(Debug)]
pub struct FakeThermometer {
    pub next: Reading,
    pub resets: usize,
}

impl Default for FakeThermometer {
    fn default() -> Self {
        Self {
            next: Reading::Busy,
            resets: 0,
        }
    }
}

impl Thermometer for FakeThermometer {
    fn read(&mut self) -> Reading {
        self.next
    }

    fn hard_reset(&mut self) {
        self.resets += 1;
    }
}

#[derive(Debug, Default)]
pub struct FakeTouch {
    pub select: bool,
    pub modify: bool,
    /// Select drops out right after the next sample
    pub glitch: bool,
}

impl TouchSensors for FakeTouch {
    fn is_active(&mut self, sensor: Sensor) -> bool {
        match sensor {
            Sensor::Select => {
                let active = self.select;
                if self.glitch {
                    self.glitch = false;
                    self.select = false;
                }
                active
            }
            Sensor::Modify => self.modify,
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeDisplay {
    pub frame: Option<Frame>,
    pub last_message: Option<Message>,
}

impl Display for FakeDisplay {
    fn show(&mut self, frame: &Frame) {
        self.frame = Some(*frame);
        if let Some(message) = [Message::On, Message::Off, Message::Auto]
            .into_iter()
            .find(|&message| Frame::message(message) == *frame)
        {
            self.last_message = Some(message);
        }
    }
}

#[derive(Debug, Default)]
pub struct FakePin {
    pub high: bool,
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeFadeHardware {
    pub duty: u16,
    pub armed: bool,
    pub preload: u8,
    pub arms: usize,
}

impl FadeHardware for FakeFadeHardware {
    fn set_duty(&mut self, duty: u16) {
        self.duty = duty;
    }

    fn arm(&mut self, preload: u8) {
        self.armed = true;
        self.preload = preload;
        self.arms += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct OutOfRange;

/// EEPROM image in RAM
#[derive(Debug)]
pub struct RamStore {
    pub bytes: [u8; 64],
    pub writes: usize,
}

impl RamStore {
    /// Erased EEPROM reads back as 0xFF
    pub fn blank() -> Self {
        Self {
            bytes: [0xFF; 64],
            writes: 0,
        }
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, OutOfRange> {
        let start = offset as usize;
        let end = start + len;
        if end > self.bytes.len() {
            return Err(OutOfRange);
        }
        Ok(start..end)
    }
}

impl ReadStorage for RamStore {
    type Error = OutOfRange;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl Storage for RamStore {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        self.bytes[range].copy_from_slice(bytes);
        self.writes += bytes.len();
        Ok(())
    }
}

/// Serial port fed from a byte script, capturing everything written
#[derive(Debug, Default)]
pub struct FakeSerial {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    pub flushed: bool,
}

impl FakeSerial {
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            rx: input.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn output(&self) -> &str {
        core::str::from_utf8(&self.tx).unwrap()
    }

    /// Bytes not yet read
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Buffered for FakeSerial {
    fn buffered(&self) -> usize {
        self.rx.len()
    }
}

impl serial::Read<u8> for FakeSerial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for FakeSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.tx.push(word);
        self.flushed = false;
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.flushed = true;
        Ok(())
    }
}

/// Sender that keeps typing: one more byte arrives for every byte echoed
#[derive(Debug, Default)]
pub struct StreamingSerial {
    script: VecDeque<u8>,
    arrived: usize,
    pub reads: usize,
    pub writes: usize,
}

impl StreamingSerial {
    pub fn new(script: &[u8], arrived: usize) -> Self {
        Self {
            script: script.iter().copied().collect(),
            arrived: arrived.min(script.len()),
            ..Self::default()
        }
    }
}

impl Buffered for StreamingSerial {
    fn buffered(&self) -> usize {
        self.arrived
    }
}

impl serial::Read<u8> for StreamingSerial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if self.arrived == 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.arrived -= 1;
        self.reads += 1;
        self.script.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for StreamingSerial {
    type Error = Infallible;

    fn write(&mut self, _word: u8) -> nb::Result<(), Self::Error> {
        self.writes += 1;
        if self.arrived < self.script.len() {
            self.arrived += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

/// Watchdog that counts its feeds
#[derive(Debug, Default)]
pub struct FakeWatchdog {
    pub feeds: usize,
}

impl embedded_hal::watchdog::Watchdog for FakeWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

pub struct TestBoard;

impl Board for TestBoard {
    type Rtc = FakeRtc;
    type Thermometer = FakeThermometer;
    type Touch = FakeTouch;
    type Display = FakeDisplay;
    type HeaterPin = FakePin;
    type FadeHardware = FakeFadeHardware;
    type Storage = RamStore;
    type Delay = MockNoop;
}

pub fn peripherals() -> Peripherals<TestBoard> {
    Peripherals {
        rtc: FakeRtc::default(),
        thermometer: FakeThermometer::default(),
        touch: FakeTouch::default(),
        display: FakeDisplay::default(),
        heater: FakePin::default(),
        fade: FakeFadeHardware::default(),
        storage: RamStore::blank(),
        delay: MockNoop::new(),
    }
}

/// Freshly booted aquarium on a blank store
pub fn aquarium(fade: &'static FadeEngine) -> Aquarium<TestBoard> {
    Aquarium::new(fade, peripherals()).unwrap()
}

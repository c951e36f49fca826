//! Bit-banged serial buses for the clock and thermometer chips

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

use super::gpio::board;
use super::timer::BusyDelay;
use crate::drivers::{OneWire, ThreeWire};

/// DS1302 link: CE, SCLK and a bidirectional IO line
pub struct ClockBus {
    enable: board::RtcEnable,
    clock: board::RtcClock,
    io: board::RtcData,
    delay: BusyDelay,
}

impl ClockBus {
    pub fn new(
        mut enable: board::RtcEnable,
        mut clock: board::RtcClock,
        io: board::RtcData,
    ) -> Self {
        let _ = enable.set_low();
        let _ = clock.set_low();
        Self {
            enable,
            clock,
            io,
            delay: BusyDelay,
        }
    }
}

impl ThreeWire for ClockBus {
    fn write_byte(&mut self, byte: u8) {
        let _ = self.clock.set_low();
        let _ = self.enable.set_high();
        for bit in 0..8 {
            let _ = self.clock.set_low();
            self.delay.delay_us(1);
            if byte & (1 << bit) != 0 {
                self.io.drive_high();
            } else {
                self.io.drive_low();
            }
            // Chip samples on the rising edge
            let _ = self.clock.set_high();
            self.delay.delay_us(1);
        }
    }

    fn read_byte(&mut self) -> u8 {
        self.io.drive_high();
        self.io.release();
        let mut byte = 0;
        for bit in 0..8 {
            let _ = self.clock.set_low();
            if self.io.is_high() {
                byte |= 1 << bit;
            }
            self.delay.delay_us(1);
            let _ = self.clock.set_high();
            self.delay.delay_us(1);
        }
        byte
    }

    fn finish(&mut self) {
        let _ = self.enable.set_low();
        let _ = self.clock.set_low();
    }
}

/// 1-Wire master on one open-drain line with an external pull-up
pub struct ThermometerBus {
    dq: board::ThermometerData,
    delay: BusyDelay,
}

impl ThermometerBus {
    pub fn new(dq: board::ThermometerData) -> Self {
        Self {
            dq,
            delay: BusyDelay,
        }
    }

    fn write_bit(&mut self, bit: bool) {
        avr_device::interrupt::free(|_| {
            self.dq.drive_low();
            self.delay.delay_us(1);
            if bit {
                self.dq.release();
            }
            self.delay.delay_us(60);
            self.dq.release();
            self.delay.delay_us(1);
        });
    }

    fn read_bit(&mut self) -> bool {
        avr_device::interrupt::free(|_| {
            self.dq.drive_low();
            self.delay.delay_us(1);
            self.dq.release();
            self.delay.delay_us(12);
            let bit = self.dq.is_high();
            self.delay.delay_us(48);
            bit
        })
    }
}

impl OneWire for ThermometerBus {
    fn reset(&mut self) -> bool {
        self.dq.drive_low();
        self.delay.delay_us(480);
        let present = avr_device::interrupt::free(|_| {
            self.dq.release();
            self.delay.delay_us(60);
            !self.dq.is_high()
        });
        self.delay.delay_us(420);
        present
    }

    fn write_byte(&mut self, byte: u8) {
        for bit in 0..8 {
            self.write_bit(byte & (1 << bit) != 0);
        }
    }

    fn read_byte(&mut self) -> u8 {
        let mut byte = 0;
        for bit in 0..8 {
            if self.read_bit() {
                byte |= 1 << bit;
            }
        }
        byte
    }

    fn line_is_high(&mut self) -> bool {
        self.dq.is_high()
    }
}

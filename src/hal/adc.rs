use avr_device::atmega128a::ADC;

use crate::drivers::{Sensor, TouchSensors};

#[derive(Clone, Copy)]
#[repr(u8)]
pub enum AdcChannel {
    Adc0 = 0,
    Adc1 = 1,
    Adc2 = 2,
    Adc3 = 3,
    Adc4 = 4,
    Adc5 = 5,
    Adc6 = 6,
    Adc7 = 7,
}

/// Readings above this count as a finger on the pad
pub const TOUCH_THRESHOLD: u16 = 512;

pub struct Adc {
    _private: (),
}

impl Adc {
    pub fn new() -> Self {
        unsafe {
            let p = ADC::ptr();
            // Enable ADC, prescaler div64 (250kHz @ 16MHz)
            (*p).adcsra.write(|w| w.bits(0x86));
            // Reference voltage = AVCC
            (*p).admux.write(|w| w.bits(0x40));
        }
        Self { _private: () }
    }

    pub fn read_channel(&mut self, channel: AdcChannel) -> u16 {
        unsafe {
            let p = ADC::ptr();

            (*p).admux.modify(|r, w| w.bits((r.bits() & 0xE0) | (channel as u8)));

            // Start conversion and wait for ADSC to clear
            (*p).adcsra.modify(|r, w| w.bits(r.bits() | 0x40));
            while (*p).adcsra.read().bits() & 0x40 != 0 {}

            // ADCL must be read first
            let low = (*p).adcl.read().bits() as u16;
            let high = (*p).adch.read().bits() as u16;

            (high << 8) | low
        }
    }
}

impl Default for Adc {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacitive pads on ADC6 (Select) and ADC7 (Modify)
pub struct TouchPads {
    adc: Adc,
}

impl TouchPads {
    pub fn new(adc: Adc) -> Self {
        Self { adc }
    }
}

impl TouchSensors for TouchPads {
    fn is_active(&mut self, sensor: Sensor) -> bool {
        let channel = match sensor {
            Sensor::Select => AdcChannel::Adc6,
            Sensor::Modify => AdcChannel::Adc7,
        };
        self.adc.read_channel(channel) > TOUCH_THRESHOLD
    }
}

use avr_device::atmega128a::{TC0, TC2};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

use crate::config::CPU_FREQ_HZ;

// TIMSK / TIFR bits
const TOIE0: u8 = 1 << 0;
const TOV0: u8 = 1 << 0;
const TOIE2: u8 = 1 << 6;

/// Timer0 clock selects (Timer0 has the asynchronous prescaler on this part)
#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div32 = 3,
    Div64 = 4,
    Div128 = 5,
    Div256 = 6,
    Div1024 = 7,
}

/// Timer0 in normal mode, paces the light fade one overflow at a time
pub struct StepTimer {
    _private: (),
}

impl StepTimer {
    pub fn new() -> Self {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
        }
        Self { _private: () }
    }

    /// Handle for the overflow handler, leaves the timer as configured
    ///
    /// # Safety
    /// Only the fade interrupt may hold a second handle.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    pub fn start(&mut self, prescaler: Prescaler) {
        unsafe {
            (*TC0::ptr()).tccr0.modify(|r, w| w.bits((r.bits() & !0x07) | prescaler as u8));
        }
    }

    pub fn set_counter(&mut self, value: u8) {
        unsafe {
            (*TC0::ptr()).tcnt0.write(|w| w.bits(value));
        }
    }

    pub fn enable_overflow_interrupt(&mut self) {
        unsafe {
            // Drop a stale overflow before unmasking
            (*TC0::ptr()).tifr.write(|w| w.bits(TOV0));
            (*TC0::ptr()).timsk.modify(|r, w| w.bits(r.bits() | TOIE0));
        }
    }

    pub fn disable_overflow_interrupt(&mut self) {
        unsafe {
            (*TC0::ptr()).timsk.modify(|r, w| w.bits(r.bits() & !TOIE0));
        }
    }
}

impl Default for StepTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer2 overflow at clk/64, about 1 kHz, drives the display multiplexer
pub fn start_refresh_timer() {
    unsafe {
        let p = TC2::ptr();
        (*p).tcnt2.write(|w| w.bits(0));
        // CS22:CS20 = 011
        (*p).tccr2.write(|w| w.bits(0x03));
        (*p).timsk.modify(|r, w| w.bits(r.bits() | TOIE2));
    }
}

/// Calibrated busy loop, interrupts stretch it
#[derive(Clone, Copy, Debug, Default)]
pub struct BusyDelay;

// Four cycles per iteration of the inner loop
const LOOPS_PER_US: u32 = CPU_FREQ_HZ / 1_000_000 / 4;

impl DelayUs<u16> for BusyDelay {
    fn delay_us(&mut self, us: u16) {
        for _ in 0..us as u32 * LOOPS_PER_US {
            avr_device::asm::nop();
        }
    }
}

impl DelayMs<u16> for BusyDelay {
    fn delay_ms(&mut self, ms: u16) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}

impl DelayMs<u8> for BusyDelay {
    fn delay_ms(&mut self, ms: u8) {
        DelayMs::<u16>::delay_ms(self, ms as u16);
    }
}

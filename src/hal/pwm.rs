//! Light output on Timer1
//!
//! Fast PWM with ICR1 as TOP (mode 14) and TOP pinned at 0xFFFF, so the
//! compare value is the duty cycle in 1/65535 steps. Timer0 paces the fade.

use avr_device::atmega128a::TC1;

use super::gpio::board;
use super::timer::{Prescaler, StepTimer};
use crate::drivers::FadeHardware;

/// OC1A (PB5) driver
pub struct Pwm {
    _private: (),
}

impl Pwm {
    /// Takes OC1A, which must already be an output for COM1A to drive it
    pub fn new(_pin: board::LightPwm) -> Self {
        unsafe {
            let p = TC1::ptr();
            (*p).ocr1a.write(|w| w.bits(0));
            (*p).icr1.write(|w| w.bits(0xFFFF));
            // COM1A1 non-inverting, WGM11
            (*p).tccr1a.write(|w| w.bits(0x82));
            // WGM13 | WGM12, clk/1
            (*p).tccr1b.write(|w| w.bits(0x19));
        }
        Self { _private: () }
    }

    /// # Safety
    /// Only the fade interrupt may hold a second handle.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    pub fn set_duty(&mut self, duty: u16) {
        unsafe {
            (*TC1::ptr()).ocr1a.write(|w| w.bits(duty));
        }
    }
}

/// Compare output plus step timer, the hardware half of the fade engine
pub struct FadeOutput {
    pwm: Pwm,
    timer: StepTimer,
}

impl FadeOutput {
    pub fn new(pin: board::LightPwm) -> Self {
        let mut timer = StepTimer::new();
        timer.start(Prescaler::Div64);
        Self {
            pwm: Pwm::new(pin),
            timer,
        }
    }

    /// Handle for `TIMER0_OVF`
    ///
    /// # Safety
    /// The peripherals must already be set up by [`FadeOutput::new`].
    pub unsafe fn steal() -> Self {
        Self {
            pwm: Pwm::steal(),
            timer: StepTimer::steal(),
        }
    }
}

impl FadeHardware for FadeOutput {
    fn set_duty(&mut self, duty: u16) {
        self.pwm.set_duty(duty);
    }

    fn arm(&mut self, preload: u8) {
        self.timer.set_counter(preload);
        self.timer.enable_overflow_interrupt();
    }

    fn disarm(&mut self) {
        self.timer.disable_overflow_interrupt();
    }
}

//! Multiplexed four-digit LED display
//!
//! Segments A..G and the dot sit on PORTA0..7 in frame bit order, the digit
//! commons on PG0..PG3, all active high. `TIMER2_OVF` lights one digit per
//! overflow.

use avr_device::atmega128a::{PORTA, PORTG};
use avr_device::interrupt::Mutex;
use core::cell::Cell;

use super::timer::start_refresh_timer;
use crate::drivers::{Display, Frame};

const DIGITS: usize = 4;
const DIGIT_MASK: u8 = 0x0F;

static FRAME: Mutex<Cell<Frame>> = Mutex::new(Cell::new(Frame([0; DIGITS])));
static CURRENT: Mutex<Cell<usize>> = Mutex::new(Cell::new(0));

pub struct SegmentDisplay {
    _private: (),
}

impl SegmentDisplay {
    pub fn new(_porta: PORTA, _portg: PORTG) -> Self {
        unsafe {
            (*PORTA::ptr()).porta.write(|w| w.bits(0));
            (*PORTA::ptr()).ddra.write(|w| w.bits(0xFF));
            (*PORTG::ptr()).portg.modify(|r, w| w.bits(r.bits() & !DIGIT_MASK));
            (*PORTG::ptr()).ddrg.modify(|r, w| w.bits(r.bits() | DIGIT_MASK));
        }
        start_refresh_timer();
        Self { _private: () }
    }
}

impl Display for SegmentDisplay {
    fn show(&mut self, frame: &Frame) {
        avr_device::interrupt::free(|cs| FRAME.borrow(cs).set(*frame));
    }
}

#[avr_device::interrupt(atmega128a)]
fn TIMER2_OVF() {
    avr_device::interrupt::free(|cs| {
        let digit = CURRENT.borrow(cs).get();
        let Frame(segments) = FRAME.borrow(cs).get();
        unsafe {
            // Blank before switching digits to avoid ghosting
            (*PORTG::ptr()).portg.modify(|r, w| w.bits(r.bits() & !DIGIT_MASK));
            (*PORTA::ptr()).porta.write(|w| w.bits(segments[digit]));
            (*PORTG::ptr()).portg.modify(|r, w| w.bits(r.bits() | (1 << digit)));
        }
        CURRENT.borrow(cs).set((digit + 1) % DIGITS);
    });
}

//! Display front end with a hold time for canned messages

use super::state::Temperature;
use super::datetime::DateTime;
use crate::config::MESSAGE_HOLD_CYCLES;
use crate::drivers::{Display, Frame, Message};

pub struct Screen<D> {
    display: D,
    /// Scheduler cycles left before a message may be overwritten
    hold: u8,
}

impl<D: Display> Screen<D> {
    pub fn new(display: D) -> Self {
        Self { display, hold: 0 }
    }

    pub fn show_time(&mut self, now: &DateTime) {
        if self.hold == 0 {
            self.display.show(&Frame::time(now.hour, now.min, now.sec));
        }
    }

    pub fn show_temperature(&mut self, temperature: Temperature) {
        if self.hold == 0 {
            self.display.show(&Frame::temperature(temperature));
        }
    }

    pub fn show_message(&mut self, message: Message) {
        self.hold = MESSAGE_HOLD_CYCLES;
        self.display.show(&Frame::message(message));
    }

    /// Count one scheduler cycle off the hold, true when it just ran out
    pub fn tick(&mut self) -> bool {
        match self.hold {
            0 => false,
            _ => {
                self.hold -= 1;
                self.hold == 0
            }
        }
    }

    pub fn release(&mut self) {
        self.hold = 0;
    }

    pub fn is_holding(&self) -> bool {
        self.hold > 0
    }

    pub fn display(&self) -> &D {
        &self.display
    }
}

//! Heater relay on a digital output

use embedded_hal::digital::v2::OutputPin;
use log::warn;

pub struct Heater<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Heater<P> {
    /// Takes the relay pin and drives it low
    pub fn new(pin: P) -> Self {
        let mut heater = Self { pin, on: true };
        heater.off();
        heater
    }

    pub fn on(&mut self) {
        if self.pin.set_high().is_err() {
            warn!("heater pin refused to go high");
        }
        self.on = true;
    }

    pub fn off(&mut self) {
        if self.pin.set_low().is_err() {
            warn!("heater pin refused to go low");
        }
        self.on = false;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::pin::{Mock, State, Transaction};

    #[test]
    fn starts_off_and_follows_commands() {
        let expectations = [
            Transaction::set(State::Low),
            Transaction::set(State::High),
            Transaction::set(State::Low),
        ];
        let mut heater = Heater::new(Mock::new(&expectations));
        assert!(!heater.is_on());

        heater.on();
        assert!(heater.is_on());
        heater.off();
        assert!(!heater.is_on());

        heater.release().done();
    }
}

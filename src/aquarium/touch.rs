//! Touch task: display toggle and manual override cycling

use embedded_hal::blocking::delay::DelayMs;
use log::debug;

use super::state::{DisplayMode, Mode};
use super::{Aquarium, Board};
use crate::config::TOUCH_SETTLE_MS;
use crate::drivers::{Message, Sensor, TouchSensors};

/// Step of the manual override cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Override {
    ManualOn,
    ManualOff,
    Auto,
}

impl Override {
    /// Auto -> ManualOn -> ManualOff -> Auto, keyed on the live output
    pub fn next(mode: Mode, output_on: bool) -> Self {
        match (mode, output_on) {
            (Mode::Auto, _) => Override::ManualOn,
            (Mode::Manual, true) => Override::ManualOff,
            (Mode::Manual, false) => Override::Auto,
        }
    }

    pub fn mode(self) -> Mode {
        match self {
            Override::Auto => Mode::Auto,
            Override::ManualOn | Override::ManualOff => Mode::Manual,
        }
    }

    pub fn message(self) -> Message {
        match self {
            Override::ManualOn => Message::On,
            Override::ManualOff => Message::Off,
            Override::Auto => Message::Auto,
        }
    }
}

impl<B: Board> Aquarium<B> {
    pub fn process_sensors(&mut self) {
        if self.screen.tick() {
            self.refresh_display();
        }

        let select = self.touch.is_active(Sensor::Select);
        if !select || self.state.prev_select {
            self.state.prev_select = select;
            return;
        }

        self.delay.delay_ms(TOUCH_SETTLE_MS);
        if !self.touch.is_active(Sensor::Select) {
            self.state.prev_select = false;
            return;
        }
        self.state.prev_select = true;

        if self.touch.is_active(Sensor::Modify) {
            self.cycle_override();
        } else {
            self.toggle_display();
        }
    }

    fn toggle_display(&mut self) {
        let display = self.state.settings.display.toggled();
        debug!("display mode {:?}", display);
        self.state.settings.display = display;
        // Store failures are logged; the toggle still takes effect
        let _ = self.persist();
        self.screen.release();
        self.refresh_display();
    }

    fn cycle_override(&mut self) {
        let step = match self.state.settings.display {
            DisplayMode::Temperature => {
                let step = Override::next(self.state.settings.heat.mode, self.heater.is_on());
                self.apply_heat_override(step);
                step
            }
            DisplayMode::Time => {
                let step = Override::next(self.state.settings.light.mode, self.dimmer.status().rising);
                self.apply_light_override(step);
                step
            }
        };
        debug!("override {:?} for {:?}", step, self.state.settings.display);
        let _ = self.persist();
        self.screen.show_message(step.message());
    }

    pub(crate) fn apply_heat_override(&mut self, step: Override) {
        self.state.settings.heat.mode = step.mode();
        match step {
            Override::ManualOn => self.heater_on_if_safe(),
            Override::ManualOff => self.heater.off(),
            Override::Auto => {}
        }
    }

    pub(crate) fn apply_light_override(&mut self, step: Override) {
        self.state.settings.light.mode = step.mode();
        match step {
            Override::ManualOn => self.dimmer.on(),
            Override::ManualOff => self.dimmer.off(),
            Override::Auto => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aquarium::Temperature;
    use crate::drivers::{FadeEngine, Frame};
    use crate::testing;

    fn touch(aquarium: &mut Aquarium<testing::TestBoard>, modify: bool) {
        aquarium.touch.select = true;
        aquarium.touch.modify = modify;
        aquarium.process_sensors();
        aquarium.touch.select = false;
        aquarium.touch.modify = false;
        aquarium.process_sensors();
    }

    #[test]
    fn select_toggles_and_persists_display_mode() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);
        assert_eq!(aquarium.settings().display, DisplayMode::Time);

        touch(&mut aquarium, false);
        assert_eq!(aquarium.settings().display, DisplayMode::Temperature);
        assert_eq!(aquarium.store.storage().bytes[12], 2);
        assert_eq!(
            aquarium.screen.display().frame,
            Some(Frame::temperature(Temperature::Unknown))
        );

        touch(&mut aquarium, false);
        assert_eq!(aquarium.settings().display, DisplayMode::Time);
        assert_eq!(aquarium.store.storage().bytes[12], 1);
    }

    #[test]
    fn held_select_fires_once() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);

        aquarium.touch.select = true;
        for _ in 0..5 {
            aquarium.process_sensors();
        }
        assert_eq!(aquarium.settings().display, DisplayMode::Temperature);
    }

    #[test]
    fn bounce_is_ignored() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);

        aquarium.touch.select = true;
        aquarium.touch.glitch = true;
        aquarium.process_sensors();
        assert_eq!(aquarium.settings().display, DisplayMode::Time);
        assert!(!aquarium.state().prev_select);
    }

    #[test]
    fn light_override_cycles_with_period_three() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);
        assert_eq!(aquarium.settings().light.mode, Mode::Auto);

        let mut seen = [Mode::Auto; 6];
        let mut messages = [None; 6];
        for i in 0..6 {
            touch(&mut aquarium, true);
            seen[i] = aquarium.settings().light.mode;
            messages[i] = aquarium.screen.display().last_message;
        }
        assert_eq!(
            seen,
            [Mode::Manual, Mode::Manual, Mode::Auto, Mode::Manual, Mode::Manual, Mode::Auto]
        );
        assert_eq!(aquarium.settings().display, DisplayMode::Time);
        assert_eq!(
            messages,
            [Message::On, Message::Off, Message::Auto, Message::On, Message::Off, Message::Auto]
                .map(Some)
        );
    }

    #[test]
    fn heater_override_follows_the_relay() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);
        aquarium.state.settings.display = DisplayMode::Temperature;
        aquarium.state.temperature = Temperature::Celsius(24);

        touch(&mut aquarium, true);
        assert_eq!(aquarium.settings().heat.mode, Mode::Manual);
        assert!(aquarium.heater_is_on());
        assert_eq!(aquarium.store.storage().bytes[10], b'm');

        touch(&mut aquarium, true);
        assert_eq!(aquarium.settings().heat.mode, Mode::Manual);
        assert!(!aquarium.heater_is_on());

        touch(&mut aquarium, true);
        assert_eq!(aquarium.settings().heat.mode, Mode::Auto);
        assert_eq!(aquarium.store.storage().bytes[10], b'a');
        assert_eq!(aquarium.settings().display, DisplayMode::Temperature);
    }

    #[test]
    fn message_is_held_then_reverts() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);

        aquarium.touch.select = true;
        aquarium.touch.modify = true;
        aquarium.process_sensors();
        assert_eq!(aquarium.screen.display().frame, Some(Frame::message(Message::On)));

        aquarium.process_time();
        assert_eq!(aquarium.screen.display().frame, Some(Frame::message(Message::On)));

        aquarium.touch.select = false;
        aquarium.process_sensors();
        assert!(aquarium.screen.is_holding());
        aquarium.process_sensors();
        assert!(!aquarium.screen.is_holding());
        assert_eq!(
            aquarium.screen.display().frame,
            Some(Frame::time(0, 0, 0))
        );
    }
}

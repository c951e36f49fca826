//! Heater task: thermometer polling, hysteresis and the overheat cut-off

use log::{debug, warn};

use super::state::{DisplayMode, Mode, Temperature};
use super::{Aquarium, Board};
use crate::config::{TEMP_FAIL_LIMIT, TEMP_POWER_ON_DEFAULT_C};
use crate::drivers::{Reading, Thermometer};

impl<B: Board> Aquarium<B> {
    pub fn process_heat(&mut self) {
        self.sample_temperature();

        let heat = self.state.settings.heat;
        if heat.mode == Mode::Auto {
            if let Temperature::Celsius(value) = self.state.temperature {
                if value < heat.low as i8 {
                    self.heater.on();
                } else if value > heat.high as i8 {
                    self.heater.off();
                }
            }
        }

        if !self.heat_is_safe() && self.heater.is_on() {
            warn!("heater forced off, temperature {:?}", self.state.temperature);
            self.heater.off();
        }

        if self.state.settings.display == DisplayMode::Temperature {
            self.screen.show_temperature(self.state.temperature);
        }
    }

    fn sample_temperature(&mut self) {
        match self.thermometer.read() {
            Reading::Busy => {}
            Reading::Error => {
                self.state.temp_failures += 1;
                if self.state.temp_failures > TEMP_FAIL_LIMIT {
                    warn!("thermometer failed {} times, resetting", self.state.temp_failures);
                    self.state.temperature = Temperature::Unknown;
                    self.state.temp_failures = 0;
                    self.thermometer.hard_reset();
                }
            }
            // Power-on value of a freshly reset sensor, not a real reading
            Reading::Celsius(TEMP_POWER_ON_DEFAULT_C)
                if self.state.temperature == Temperature::Unknown =>
            {
                self.state.temp_failures = 0;
            }
            Reading::Celsius(value) => {
                self.state.temp_failures = 0;
                if self.state.temperature != Temperature::Celsius(value) {
                    debug!("water at {} C", value);
                }
                self.state.temperature = Temperature::Celsius(value);
            }
        }
    }
}

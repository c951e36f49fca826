//! Light task: follow the on/off schedule in auto mode

use log::debug;

use super::datetime::TimeOfDay;
use super::state::{LightSettings, Mode};
use super::{Aquarium, Board};

/// True while `now` lies strictly inside the on..off window
pub fn is_scheduled_on(light: &LightSettings, now: TimeOfDay) -> bool {
    now > light.on && light.off > now
}

impl<B: Board> Aquarium<B> {
    pub fn process_light(&mut self) {
        let light = self.state.settings.light;
        if light.mode != Mode::Auto {
            return;
        }

        let rising = self.dimmer.status().rising;
        if is_scheduled_on(&light, self.state.now.time()) {
            if !rising {
                debug!("light schedule: on");
            }
            self.dimmer.rise();
        } else {
            if rising {
                debug!("light schedule: off");
            }
            self.dimmer.fall();
        }
    }

    /// Push level and rise time from the settings into the fade engine
    pub(crate) fn retarget_light(&mut self) {
        let light = self.state.settings.light;
        self.dimmer.set_target(light.level, light.rise);
    }
}

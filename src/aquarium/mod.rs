//! Aquarium control core
//!
//! [`Aquarium`] is the context object: it owns the state record, the
//! settings store and every driver. The scheduler hands it out by `&mut`
//! to one task at a time; the tasks themselves live in the submodules as
//! further `impl` blocks.

pub mod clock;
pub mod datetime;
pub mod heater;
pub mod light;
pub mod screen;
pub mod settings;
pub mod state;
pub mod touch;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use embedded_storage::Storage;
use log::{info, warn};

use crate::config::HEAT_SAFETY_CEILING_C;
use crate::drivers::{
    Display, Dimmer, FadeEngine, FadeHardware, Heater, Rtc, Thermometer, TouchSensors,
};
pub use screen::Screen;
pub use settings::{SettingsStore, StoreError};
pub use state::{
    AquariumState, Correction, DisplayMode, HeaterSettings, LightSettings, Mode, Settings, Sign,
    Temperature,
};

/// Concrete driver types of one board
pub trait Board {
    type Rtc: Rtc;
    type Thermometer: Thermometer;
    type Touch: TouchSensors;
    type Display: Display;
    type HeaterPin: OutputPin;
    type FadeHardware: FadeHardware;
    type Storage: Storage;
    type Delay: DelayMs<u8>;
}

/// Driver instances handed to [`Aquarium::new`]
pub struct Peripherals<B: Board> {
    pub rtc: B::Rtc,
    pub thermometer: B::Thermometer,
    pub touch: B::Touch,
    pub display: B::Display,
    pub heater: B::HeaterPin,
    pub fade: B::FadeHardware,
    pub storage: B::Storage,
    pub delay: B::Delay,
}

pub struct Aquarium<B: Board> {
    pub(crate) state: AquariumState,
    pub(crate) store: SettingsStore<B::Storage>,
    pub(crate) rtc: B::Rtc,
    pub(crate) thermometer: B::Thermometer,
    pub(crate) touch: B::Touch,
    pub(crate) screen: Screen<B::Display>,
    pub(crate) heater: Heater<B::HeaterPin>,
    pub(crate) dimmer: Dimmer<B::FadeHardware>,
    pub(crate) delay: B::Delay,
}

impl<B: Board> Aquarium<B> {
    /// Boot sequence: load settings, recall the last correction point, set up the dimmer
    pub fn new(fade: &'static FadeEngine, peripherals: Peripherals<B>) -> Result<Self, StoreError> {
        let Peripherals {
            mut rtc,
            thermometer,
            touch,
            display,
            heater,
            fade: fade_hardware,
            storage,
            delay,
        } = peripherals;

        let mut store = SettingsStore::new(storage);
        let settings = store.load()?;

        let mut state = AquariumState {
            settings,
            ..AquariumState::default()
        };
        state.now = rtc.read_datetime();
        state.adjusted = rtc.read_scratch();

        let mut dimmer = Dimmer::new(fade, fade_hardware);
        dimmer.set_target(settings.light.level, settings.light.rise);

        info!(
            "aquarium up, heat {}-{}, light {}% over {} min",
            settings.heat.low, settings.heat.high, settings.light.level, settings.light.rise
        );

        let mut aquarium = Self {
            state,
            store,
            rtc,
            thermometer,
            touch,
            screen: Screen::new(display),
            heater: Heater::new(heater),
            dimmer,
            delay,
        };
        aquarium.refresh_display();
        Ok(aquarium)
    }

    pub fn state(&self) -> &AquariumState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn heater_is_on(&self) -> bool {
        self.heater.is_on()
    }

    /// Redraw whatever the display mode asks for, unless a message is held
    pub fn refresh_display(&mut self) {
        match self.state.settings.display {
            DisplayMode::Time => self.screen.show_time(&self.state.now),
            DisplayMode::Temperature => self.screen.show_temperature(self.state.temperature),
        }
    }

    /// Switch the heater on only while the water is known to be safe
    pub(crate) fn heater_on_if_safe(&mut self) {
        if self.heat_is_safe() {
            self.heater.on();
        } else {
            self.heater.off();
        }
    }

    pub(crate) fn heat_is_safe(&self) -> bool {
        self.state.temperature.is_at_most(HEAT_SAFETY_CEILING_C)
    }

    /// Write the settings record through, logging a failure
    pub(crate) fn persist(&mut self) -> Result<(), StoreError> {
        self.store.save(&self.state.settings).inspect_err(|err| {
            warn!("{}", err);
        })
    }

    /// Heater off ahead of a watchdog restart
    pub fn shutdown(&mut self) {
        self.heater.off();
    }
}

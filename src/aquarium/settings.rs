//! Persisted settings in the on-chip EEPROM
//!
//! One byte per field at fixed offsets. Writes go through [`SettingsStore::save`],
//! which only touches bytes whose value changed, so saving an unchanged record
//! costs no EEPROM wear.

use embedded_storage::Storage;
use log::{info, warn};
use thiserror::Error;

use super::datetime::TimeOfDay;
use super::state::{Correction, DisplayMode, HeaterSettings, LightSettings, Mode, Settings, Sign};
use crate::config::{HEAT_HIGH_CEILING_C, HEAT_LOW_FLOOR_C, LIGHT_LEVEL_MAX, LIGHT_RISE_MAX_MIN};

const HEAT_LOW: usize = 0;
const HEAT_HIGH: usize = 1;
const LIGHT_ON: usize = 2;
const LIGHT_OFF: usize = 5;
const CORRECTION_SIGN: usize = 8;
const CORRECTION_SECONDS: usize = 9;
const HEAT_MODE: usize = 10;
const LIGHT_MODE: usize = 11;
const DISPLAY_MODE: usize = 12;
const LIGHT_LEVEL: usize = 13;
const LIGHT_RISE: usize = 14;

/// Bytes occupied by the settings record
pub const RECORD_LEN: usize = 15;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    #[error("store read failed at offset {0}")]
    Read(u32),
    #[error("store write failed at offset {0}")]
    Write(u32),
}

pub struct SettingsStore<S> {
    storage: S,
    base: u32,
}

impl<S: Storage> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_base(storage, 0)
    }

    /// Record placed at `base` instead of the start of the store
    pub fn with_base(storage: S, base: u32) -> Self {
        Self { storage, base }
    }

    /// Read the record, replacing invalid fields by their defaults
    ///
    /// Repaired fields are written back right away.
    pub fn load(&mut self) -> Result<Settings, StoreError> {
        let mut raw = [0u8; RECORD_LEN];
        self.storage
            .read(self.base, &mut raw)
            .map_err(|_| StoreError::Read(self.base))?;

        let (settings, repaired) = decode(&raw);
        if repaired {
            warn!("settings record invalid, restoring defaults for bad fields");
            self.save(&settings)?;
        } else {
            info!("settings loaded");
        }
        Ok(settings)
    }

    pub fn save(&mut self, settings: &Settings) -> Result<(), StoreError> {
        self.update(0, &encode(settings))
    }

    fn update(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        for (i, &byte) in bytes.iter().enumerate() {
            let address = self.base + (offset + i) as u32;
            let mut current = [0u8];
            self.storage
                .read(address, &mut current)
                .map_err(|_| StoreError::Read(address))?;
            if current[0] != byte {
                self.storage
                    .write(address, &[byte])
                    .map_err(|_| StoreError::Write(address))?;
            }
        }
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the backing store back
    pub fn release(self) -> S {
        self.storage
    }
}

fn encode(settings: &Settings) -> [u8; RECORD_LEN] {
    let Settings {
        heat,
        light,
        correction,
        display,
    } = settings;

    let mut raw = [0u8; RECORD_LEN];
    raw[HEAT_LOW] = heat.low;
    raw[HEAT_HIGH] = heat.high;
    raw[LIGHT_ON..LIGHT_ON + 3].copy_from_slice(&[light.on.hour, light.on.min, light.on.sec]);
    raw[LIGHT_OFF..LIGHT_OFF + 3].copy_from_slice(&[light.off.hour, light.off.min, light.off.sec]);
    raw[CORRECTION_SIGN] = correction.sign.to_byte();
    raw[CORRECTION_SECONDS] = correction.seconds;
    raw[HEAT_MODE] = heat.mode.to_byte();
    raw[LIGHT_MODE] = light.mode.to_byte();
    raw[DISPLAY_MODE] = display.to_byte();
    raw[LIGHT_LEVEL] = light.level;
    raw[LIGHT_RISE] = light.rise;
    raw
}

/// Decode a raw record; the flag reports whether any field needed its default
fn decode(raw: &[u8; RECORD_LEN]) -> (Settings, bool) {
    let defaults = Settings::default();
    let mut repaired = false;

    let threshold = |byte: u8| (HEAT_LOW_FLOOR_C..=HEAT_HIGH_CEILING_C).contains(&byte).then_some(byte);
    let time = |bytes: &[u8]| {
        let time = TimeOfDay::new(bytes[0], bytes[1], bytes[2]);
        time.is_valid().then_some(time)
    };

    let mut heat = HeaterSettings {
        low: or_default(threshold(raw[HEAT_LOW]), defaults.heat.low, &mut repaired),
        high: or_default(threshold(raw[HEAT_HIGH]), defaults.heat.high, &mut repaired),
        mode: or_default(Mode::from_byte(raw[HEAT_MODE]), defaults.heat.mode, &mut repaired),
    };
    if heat.low > heat.high {
        heat.low = defaults.heat.low;
        heat.high = defaults.heat.high;
        repaired = true;
    }

    let light = LightSettings {
        on: or_default(time(&raw[LIGHT_ON..LIGHT_ON + 3]), defaults.light.on, &mut repaired),
        off: or_default(time(&raw[LIGHT_OFF..LIGHT_OFF + 3]), defaults.light.off, &mut repaired),
        level: or_default(
            (raw[LIGHT_LEVEL] <= LIGHT_LEVEL_MAX).then_some(raw[LIGHT_LEVEL]),
            defaults.light.level,
            &mut repaired,
        ),
        rise: or_default(
            (raw[LIGHT_RISE] <= LIGHT_RISE_MAX_MIN).then_some(raw[LIGHT_RISE]),
            defaults.light.rise,
            &mut repaired,
        ),
        mode: or_default(Mode::from_byte(raw[LIGHT_MODE]), defaults.light.mode, &mut repaired),
    };

    let correction = Correction {
        sign: or_default(
            Sign::from_byte(raw[CORRECTION_SIGN]),
            defaults.correction.sign,
            &mut repaired,
        ),
        seconds: or_default(
            (raw[CORRECTION_SECONDS] < 60).then_some(raw[CORRECTION_SECONDS]),
            defaults.correction.seconds,
            &mut repaired,
        ),
    };

    let display = or_default(
        DisplayMode::from_byte(raw[DISPLAY_MODE]),
        defaults.display,
        &mut repaired,
    );

    (
        Settings {
            heat,
            light,
            correction,
            display,
        },
        repaired,
    )
}

fn or_default<T>(value: Option<T>, default: T, repaired: &mut bool) -> T {
    value.unwrap_or_else(|| {
        *repaired = true;
        default
    })
}

//! State record shared by the scheduled tasks

use super::datetime::{DateTime, TimeOfDay};
use crate::protocol::line::LineBuffer;

/// Whether a subsystem follows its schedule/thresholds or a fixed operator setting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Auto,
    Manual,
}

impl Mode {
    /// Legacy on-store byte
    pub fn to_byte(self) -> u8 {
        match self {
            Mode::Auto => b'a',
            Mode::Manual => b'm',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'a' => Some(Mode::Auto),
            b'm' => Some(Mode::Manual),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Time,
    Temperature,
}

impl DisplayMode {
    pub fn to_byte(self) -> u8 {
        match self {
            DisplayMode::Time => 1,
            DisplayMode::Temperature => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(DisplayMode::Time),
            2 => Some(DisplayMode::Temperature),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Time => DisplayMode::Temperature,
            DisplayMode::Temperature => DisplayMode::Time,
        }
    }
}

/// Last known water temperature
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Temperature {
    #[default]
    Unknown,
    Celsius(i8),
}

impl Temperature {
    /// True when the value is known and not above `limit`
    pub fn is_at_most(self, limit: i8) -> bool {
        matches!(self, Temperature::Celsius(value) if value <= limit)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    pub fn to_byte(self) -> u8 {
        match self {
            Sign::Plus => b'+',
            Sign::Minus => b'-',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'+' => Some(Sign::Plus),
            b'-' => Some(Sign::Minus),
            _ => None,
        }
    }
}

/// Signed number of seconds applied to the clock once a day
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Correction {
    pub sign: Sign,
    pub seconds: u8,
}

impl Correction {
    pub fn span(&self) -> TimeOfDay {
        TimeOfDay::new(0, 0, self.seconds)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaterSettings {
    /// Switch on below this temperature
    pub low: u8,
    /// Switch off above this temperature
    pub high: u8,
    pub mode: Mode,
}

impl Default for HeaterSettings {
    fn default() -> Self {
        Self {
            low: 22,
            high: 25,
            mode: Mode::Auto,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightSettings {
    pub on: TimeOfDay,
    pub off: TimeOfDay,
    /// Brightness in percent
    pub level: u8,
    /// Minutes for a full 0-100 % ramp
    pub rise: u8,
    pub mode: Mode,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            on: TimeOfDay::new(8, 0, 0),
            off: TimeOfDay::new(18, 0, 0),
            level: 50,
            rise: 15,
            mode: Mode::Auto,
        }
    }
}

/// Everything that survives a power cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    pub heat: HeaterSettings,
    pub light: LightSettings,
    pub correction: Correction,
    pub display: DisplayMode,
}

#[derive(Default)]
pub struct AquariumState {
    pub settings: Settings,
    pub temperature: Temperature,
    /// Clock reading of the last time task
    pub now: DateTime,
    /// When the daily correction was last applied (or the clock last set)
    pub adjusted: DateTime,
    /// Consecutive thermometer errors
    pub temp_failures: u8,
    /// Select sensor level seen by the previous touch task
    pub prev_select: bool,
    pub line: LineBuffer,
}

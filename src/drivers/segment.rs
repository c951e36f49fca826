//! Seven-segment frame encoding
//!
//! Bit 0 is segment A through bit 6 for segment G, bit 7 is the decimal point.
//! The display driver maps these bits onto its own segment wiring.

use crate::aquarium::Temperature;

const DIGITS: [u8; 10] = [
    0b0011_1111, // 0
    0b0000_0110, // 1
    0b0101_1011, // 2
    0b0100_1111, // 3
    0b0110_0110, // 4
    0b0110_1101, // 5
    0b0111_1101, // 6
    0b0000_0111, // 7
    0b0111_1111, // 8
    0b0110_1111, // 9
];

pub const BLANK: u8 = 0;
pub const DOT: u8 = 0b1000_0000;
pub const DASH: u8 = 0b0100_0000;
pub const DEGREE: u8 = 0b0110_0011;
pub const LETTER_C: u8 = 0b0011_1001;
pub const LETTER_O: u8 = 0b0011_1111;
pub const LETTER_N: u8 = 0b0101_0100;
pub const LETTER_F: u8 = 0b0111_0001;
pub const LETTER_A: u8 = 0b0111_0111;
pub const LETTER_U: u8 = 0b0001_1100;
pub const LETTER_T: u8 = 0b0111_1000;
pub const LETTER_LOWER_O: u8 = 0b0101_1100;

/// Canned messages shown while cycling a manual override
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Message {
    On,
    Off,
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame(pub [u8; 4]);

pub fn digit(value: u8) -> u8 {
    DIGITS[(value % 10) as usize]
}

impl Frame {
    /// "HH.MM", the separator dot blinks with the seconds
    pub fn time(hour: u8, min: u8, sec: u8) -> Self {
        let separator = if sec % 2 == 0 { DOT } else { BLANK };
        Self([
            digit(hour / 10),
            digit(hour % 10) | separator,
            digit(min / 10),
            digit(min % 10),
        ])
    }

    /// Right aligned value followed by "°C", or "--°C" when unknown
    pub fn temperature(temperature: Temperature) -> Self {
        let value = match temperature {
            Temperature::Celsius(value) => value,
            Temperature::Unknown => return Self([DASH, DASH, DEGREE, LETTER_C]),
        };

        let magnitude = value.unsigned_abs();
        let (first, second) = match (value < 0, magnitude) {
            (_, 100..) => (DASH, DASH),
            // "-12" does not fit in front of "°C", drop the unit glyph
            (true, 10..) => {
                return Self([DASH, digit(magnitude / 10), digit(magnitude % 10), DEGREE])
            }
            (true, _) => (DASH, digit(magnitude)),
            (false, 10..) => (digit(magnitude / 10), digit(magnitude % 10)),
            (false, _) => (BLANK, digit(magnitude)),
        };

        Self([first, second, DEGREE, LETTER_C])
    }

    pub fn message(message: Message) -> Self {
        match message {
            Message::On => Self([BLANK, LETTER_O, LETTER_N, BLANK]),
            Message::Off => Self([LETTER_O, LETTER_F, LETTER_F, BLANK]),
            Message::Auto => Self([LETTER_A, LETTER_U, LETTER_T, LETTER_LOWER_O]),
        }
    }
}

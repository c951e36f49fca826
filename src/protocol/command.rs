//! Command grammar
//!
//! ```text
//! status
//! date DD.MM.YY W
//! time HH:MM:SS | time +CC | time -CC | time HH:MM:SS +CC
//! heat LO-HI | heat on | heat off | heat auto
//! light HH:MM:SS-HH:MM:SS [LLL RR]
//! light on | light off | light auto | light level LLL | light rise RR
//! display time | display temp
//! reboot
//! help
//! ```
//!
//! Fields are fixed width. Out of range numbers are clamped, not rejected;
//! a field of the wrong shape makes the whole line malformed.

use thiserror::Error;

use crate::aquarium::datetime::TimeOfDay;
use crate::aquarium::{Correction, DisplayMode, Sign};
use crate::config::{HEAT_HIGH_CEILING_C, HEAT_LOW_FLOOR_C, LIGHT_LEVEL_MAX, LIGHT_RISE_MAX_MIN};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command")]
    Unknown,
    #[error("malformed arguments")]
    Malformed,
}

/// Operator setting for heater or light
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Status,
    Help,
    Reboot,
    Date {
        day: u8,
        month: u8,
        year: u8,
        weekday: u8,
    },
    Time {
        time: Option<TimeOfDay>,
        correction: Option<Correction>,
    },
    HeatLimits {
        low: u8,
        high: u8,
    },
    Heat(Switch),
    LightSchedule {
        on: TimeOfDay,
        off: TimeOfDay,
        /// Level and rise time, when given
        dimming: Option<(u8, u8)>,
    },
    Light(Switch),
    LightLevel(u8),
    LightRise(u8),
    Display(DisplayMode),
}

pub fn parse(line: &[u8]) -> Result<Command, CommandError> {
    let (keyword, args) = match line.iter().position(|&b| b == b' ') {
        Some(space) => (&line[..space], Some(&line[space + 1..])),
        None => (line, None),
    };

    match keyword {
        b"status" => bare(args, Command::Status),
        b"help" => bare(args, Command::Help),
        b"reboot" => bare(args, Command::Reboot),
        b"date" => parse_date(Fields::new(args)?),
        b"time" => parse_time(Fields::new(args)?),
        b"heat" => parse_heat(Fields::new(args)?),
        b"light" => parse_light(Fields::new(args)?),
        b"display" => match args {
            Some(b"time") => Ok(Command::Display(DisplayMode::Time)),
            Some(b"temp") => Ok(Command::Display(DisplayMode::Temperature)),
            _ => Err(CommandError::Malformed),
        },
        _ => Err(CommandError::Unknown),
    }
}

fn bare(args: Option<&[u8]>, command: Command) -> Result<Command, CommandError> {
    match args {
        None => Ok(command),
        Some(_) => Err(CommandError::Malformed),
    }
}

fn parse_date(mut fields: Fields) -> Result<Command, CommandError> {
    let day = fields.number(2)?.clamp(1, 31);
    fields.literal(b'.')?;
    let month = fields.number(2)?.clamp(1, 12);
    fields.literal(b'.')?;
    let year = fields.number(2)?;
    fields.literal(b' ')?;
    let weekday = fields.number(1)?.clamp(1, 7);
    fields.end()?;

    Ok(Command::Date {
        day,
        month,
        year,
        weekday,
    })
}

fn parse_time(mut fields: Fields) -> Result<Command, CommandError> {
    if fields.peek_sign() {
        let correction = fields.correction()?;
        fields.end()?;
        return Ok(Command::Time {
            time: None,
            correction: Some(correction),
        });
    }

    let time = fields.time()?;
    if fields.is_empty() {
        return Ok(Command::Time {
            time: Some(time),
            correction: None,
        });
    }
    fields.literal(b' ')?;
    let correction = fields.correction()?;
    fields.end()?;

    Ok(Command::Time {
        time: Some(time),
        correction: Some(correction),
    })
}

fn parse_heat(mut fields: Fields) -> Result<Command, CommandError> {
    if let Some(switch) = fields.switch() {
        return Ok(Command::Heat(switch));
    }

    let low = fields.number(2)?.max(HEAT_LOW_FLOOR_C);
    fields.literal(b'-')?;
    let high = fields.number(2)?.min(HEAT_HIGH_CEILING_C);
    fields.end()?;

    if low > high {
        return Err(CommandError::Malformed);
    }
    Ok(Command::HeatLimits { low, high })
}

fn parse_light(mut fields: Fields) -> Result<Command, CommandError> {
    if let Some(switch) = fields.switch() {
        return Ok(Command::Light(switch));
    }
    if fields.keyword(b"level ") {
        let level = fields.level()?;
        fields.end()?;
        return Ok(Command::LightLevel(level));
    }
    if fields.keyword(b"rise ") {
        let rise = fields.rise()?;
        fields.end()?;
        return Ok(Command::LightRise(rise));
    }

    let on = fields.time()?;
    fields.literal(b'-')?;
    let off = fields.time()?;
    let dimming = if fields.is_empty() {
        None
    } else {
        fields.literal(b' ')?;
        let level = fields.level()?;
        fields.literal(b' ')?;
        let rise = fields.rise()?;
        fields.end()?;
        Some((level, rise))
    };

    Ok(Command::LightSchedule { on, off, dimming })
}

/// Cursor over the argument part of a line
struct Fields<'a> {
    rest: &'a [u8],
}

impl<'a> Fields<'a> {
    /// Commands that take arguments must have some
    fn new(args: Option<&'a [u8]>) -> Result<Self, CommandError> {
        match args {
            Some(rest) if !rest.is_empty() => Ok(Self { rest }),
            _ => Err(CommandError::Malformed),
        }
    }

    fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    fn end(&self) -> Result<(), CommandError> {
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(CommandError::Malformed)
        }
    }

    fn literal(&mut self, expected: u8) -> Result<(), CommandError> {
        match self.rest.split_first() {
            Some((&byte, rest)) if byte == expected => {
                self.rest = rest;
                Ok(())
            }
            _ => Err(CommandError::Malformed),
        }
    }

    /// Consume `word` if the remaining input starts with it
    fn keyword(&mut self, word: &[u8]) -> bool {
        match self.rest.strip_prefix(word) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// Whole remaining input is one of on/off/auto
    fn switch(&mut self) -> Option<Switch> {
        let switch = match self.rest {
            b"on" => Switch::On,
            b"off" => Switch::Off,
            b"auto" => Switch::Auto,
            _ => return None,
        };
        self.rest = &[];
        Some(switch)
    }

    /// Exactly `width` decimal digits
    fn number(&mut self, width: usize) -> Result<u8, CommandError> {
        if self.rest.len() < width {
            return Err(CommandError::Malformed);
        }
        let (digits, rest) = self.rest.split_at(width);
        let mut value: u16 = 0;
        for &digit in digits {
            if !digit.is_ascii_digit() {
                return Err(CommandError::Malformed);
            }
            value = value * 10 + (digit - b'0') as u16;
        }
        self.rest = rest;
        Ok(value.min(u8::MAX as u16) as u8)
    }

    fn time(&mut self) -> Result<TimeOfDay, CommandError> {
        let hour = self.number(2)?.min(23);
        self.literal(b':')?;
        let min = self.number(2)?.min(59);
        self.literal(b':')?;
        let sec = self.number(2)?.min(59);
        Ok(TimeOfDay::new(hour, min, sec))
    }

    fn peek_sign(&self) -> bool {
        matches!(self.rest.first(), Some(b'+' | b'-'))
    }

    fn correction(&mut self) -> Result<Correction, CommandError> {
        let sign = self
            .rest
            .first()
            .and_then(|&byte| Sign::from_byte(byte))
            .ok_or(CommandError::Malformed)?;
        self.rest = &self.rest[1..];
        let seconds = self.number(2)?.min(59);
        Ok(Correction { sign, seconds })
    }

    fn level(&mut self) -> Result<u8, CommandError> {
        Ok(self.number(3)?.min(LIGHT_LEVEL_MAX))
    }

    fn rise(&mut self) -> Result<u8, CommandError> {
        Ok(self.number(2)?.min(LIGHT_RISE_MAX_MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u8, min: u8, sec: u8) -> TimeOfDay {
        TimeOfDay::new(hour, min, sec)
    }

    #[test]
    fn bare_keywords() {
        assert_eq!(parse(b"status"), Ok(Command::Status));
        assert_eq!(parse(b"help"), Ok(Command::Help));
        assert_eq!(parse(b"reboot"), Ok(Command::Reboot));
        assert_eq!(parse(b"status now"), Err(CommandError::Malformed));
    }

    #[test]
    fn unknown_and_empty_lines() {
        assert_eq!(parse(b""), Err(CommandError::Unknown));
        assert_eq!(parse(b"Status"), Err(CommandError::Unknown));
        assert_eq!(parse(b"lights on"), Err(CommandError::Unknown));
        assert_eq!(parse(b" status"), Err(CommandError::Unknown));
    }

    #[test]
    fn date_is_clamped() {
        assert_eq!(
            parse(b"date 24.12.99 3"),
            Ok(Command::Date {
                day: 24,
                month: 12,
                year: 99,
                weekday: 3
            })
        );
        assert_eq!(
            parse(b"date 00.13.05 9"),
            Ok(Command::Date {
                day: 1,
                month: 12,
                year: 5,
                weekday: 7
            })
        );
        assert_eq!(parse(b"date 1.2.24 3"), Err(CommandError::Malformed));
        assert_eq!(parse(b"date 01.02.24"), Err(CommandError::Malformed));
        assert_eq!(parse(b"date"), Err(CommandError::Malformed));
    }

    #[test]
    fn time_forms() {
        assert_eq!(
            parse(b"time 12:34:56"),
            Ok(Command::Time {
                time: Some(t(12, 34, 56)),
                correction: None
            })
        );
        assert_eq!(
            parse(b"time 25:61:99"),
            Ok(Command::Time {
                time: Some(t(23, 59, 59)),
                correction: None
            })
        );
        assert_eq!(
            parse(b"time -07"),
            Ok(Command::Time {
                time: None,
                correction: Some(Correction {
                    sign: Sign::Minus,
                    seconds: 7
                })
            })
        );
        assert_eq!(
            parse(b"time 08:00:00 +75"),
            Ok(Command::Time {
                time: Some(t(8, 0, 0)),
                correction: Some(Correction {
                    sign: Sign::Plus,
                    seconds: 59
                })
            })
        );
        assert_eq!(parse(b"time 08:00"), Err(CommandError::Malformed));
        assert_eq!(parse(b"time 08:00:00 5"), Err(CommandError::Malformed));
        assert_eq!(parse(b"time +5"), Err(CommandError::Malformed));
    }

    #[test]
    fn heat_limits() {
        assert_eq!(parse(b"heat 18-35"), Ok(Command::HeatLimits { low: 18, high: 35 }));
        assert_eq!(parse(b"heat 10-40"), Ok(Command::HeatLimits { low: 18, high: 35 }));
        assert_eq!(parse(b"heat 99-99"), Err(CommandError::Malformed));
        assert_eq!(parse(b"heat 26-24"), Err(CommandError::Malformed));
        assert_eq!(parse(b"heat on"), Ok(Command::Heat(Switch::On)));
        assert_eq!(parse(b"heat off"), Ok(Command::Heat(Switch::Off)));
        assert_eq!(parse(b"heat auto"), Ok(Command::Heat(Switch::Auto)));
        assert_eq!(parse(b"heat onn"), Err(CommandError::Malformed));
    }

    #[test]
    fn light_forms() {
        assert_eq!(parse(b"light auto"), Ok(Command::Light(Switch::Auto)));
        assert_eq!(parse(b"light level 150"), Ok(Command::LightLevel(100)));
        assert_eq!(parse(b"light level 42"), Err(CommandError::Malformed));
        assert_eq!(parse(b"light rise 45"), Ok(Command::LightRise(30)));
        assert_eq!(
            parse(b"light 08:30:00-20:00:00"),
            Ok(Command::LightSchedule {
                on: t(8, 30, 0),
                off: t(20, 0, 0),
                dimming: None
            })
        );
        assert_eq!(
            parse(b"light 08:30:00-20:00:00 080 10"),
            Ok(Command::LightSchedule {
                on: t(8, 30, 0),
                off: t(20, 0, 0),
                dimming: Some((80, 10))
            })
        );
        assert_eq!(parse(b"light 08:30:00-20:00:00 080"), Err(CommandError::Malformed));
    }

    #[test]
    fn display_modes() {
        assert_eq!(parse(b"display time"), Ok(Command::Display(DisplayMode::Time)));
        assert_eq!(parse(b"display temp"), Ok(Command::Display(DisplayMode::Temperature)));
        assert_eq!(parse(b"display"), Err(CommandError::Malformed));
    }
}

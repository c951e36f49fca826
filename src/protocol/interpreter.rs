//! Command interpreter: echo, line editing, dispatch and replies

use embedded_hal::serial;
use log::{debug, info};
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use super::command::{self, Command, Switch};
use super::line::{Feed, CR, LF};
use super::{Buffered, Flow, Reply};
use crate::aquarium::datetime::{weekday_name, TimeOfDay};
use crate::aquarium::touch::Override;
use crate::aquarium::{Aquarium, Board, DisplayMode, Mode, Sign, Temperature};
use crate::drivers::Rtc;

const HELP: &str = "\
Commands:\r\n\
  status                           show current state\r\n\
  date DD.MM.YY W                  set date, W = weekday 1-7\r\n\
  time HH:MM:SS                    set time\r\n\
  time +CC | time -CC              set daily correction in seconds\r\n\
  time HH:MM:SS +CC                set time and daily correction\r\n\
  heat LO-HI                       heater thresholds, 18-35 C\r\n\
  heat on | off | auto             heater mode\r\n\
  light HH:MM:SS-HH:MM:SS [LLL RR] light schedule, level %, rise min\r\n\
  light on | off | auto            light mode\r\n\
  light level LLL                  light level 0-100 %\r\n\
  light rise RR                    rise time 0-30 min\r\n\
  display time | temp              display mode\r\n\
  reboot                           restart the controller\r\n\
  help                             this text\r\n";

const ERASE: &str = "\x08 \x08";
const OVERFLOW: &str = "\r\nERROR\r\n";

/// `uWrite` over a blocking serial transmitter
pub struct SerialWriter<'a, S> {
    serial: &'a mut S,
}

impl<'a, S: serial::Write<u8>> SerialWriter<'a, S> {
    pub fn new(serial: &'a mut S) -> Self {
        Self { serial }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), S::Error> {
        nb::block!(self.serial.write(byte))
    }
}

impl<S: serial::Write<u8>> uWrite for SerialWriter<'_, S> {
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        s.bytes().try_for_each(|byte| self.write_byte(byte))
    }
}

/// Two-digit zero-padded field
struct Padded(u8);

impl uDisplay for Padded {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        if self.0 < 10 {
            f.write_str("0")?;
        }
        uDisplay::fmt(&self.0, f)
    }
}

struct Clock(TimeOfDay);

impl uDisplay for Clock {
    fn fmt<W: uWrite + ?Sized>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error> {
        uwrite!(f, "{}:{}:{}", Padded(self.0.hour), Padded(self.0.min), Padded(self.0.sec))
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

fn sign_str(sign: Sign) -> &'static str {
    match sign {
        Sign::Plus => "+",
        Sign::Minus => "-",
    }
}

fn mode_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Auto => "auto",
        Mode::Manual => "manual",
    }
}

impl From<Switch> for Override {
    fn from(switch: Switch) -> Self {
        match switch {
            Switch::On => Override::ManualOn,
            Switch::Off => Override::ManualOff,
            Switch::Auto => Override::Auto,
        }
    }
}

impl<B: Board> Aquarium<B> {
    /// Handle the bytes already received, without blocking
    ///
    /// Bytes arriving while this runs wait for the next call, so a steady
    /// stream cannot hold the scheduler here. Stops early after a line
    /// overflow or a reboot request.
    pub fn process_serial<S, E>(&mut self, serial: &mut S) -> Result<Flow, E>
    where
        S: Buffered + serial::Read<u8, Error = E> + serial::Write<u8, Error = E>,
    {
        for _ in 0..serial.buffered() {
            let byte = match serial.read() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(err)) => return Err(err),
            };

            let mut out = SerialWriter::new(serial);
            match self.state.line.feed(byte) {
                Feed::Stored | Feed::Ignored => out.write_byte(byte)?,
                Feed::Erased => out.write_str(ERASE)?,
                // Already echoed as part of the CR's "\r\n"
                Feed::Swallowed => {}
                Feed::Overflow => {
                    out.write_str(OVERFLOW)?;
                    return Ok(Flow::Continue);
                }
                Feed::Complete => {
                    out.write_byte(byte)?;
                    out.write_byte(if byte == CR { LF } else { CR })?;

                    let line = self.state.line.take();
                    if self.execute(&line, &mut out)? == Flow::Restart {
                        nb::block!(serial.flush())?;
                        return Ok(Flow::Restart);
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// Run one complete line and write its reply
    pub fn execute<W: uWrite>(&mut self, line: &[u8], out: &mut W) -> Result<Flow, W::Error> {
        let command = match command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                debug!("rejected line: {}", err);
                out.write_str(Reply::from(err).as_str())?;
                return Ok(Flow::Continue);
            }
        };
        debug!("command {:?}", command);

        let reply = match command {
            Command::Status => {
                self.write_status(out)?;
                return Ok(Flow::Continue);
            }
            Command::Help => {
                out.write_str(HELP)?;
                return Ok(Flow::Continue);
            }
            Command::Reboot => {
                info!("reboot requested");
                self.shutdown();
                out.write_str(Reply::Ok.as_str())?;
                return Ok(Flow::Restart);
            }
            Command::Date {
                day,
                month,
                year,
                weekday,
            } => {
                let mut now = self.rtc.read_datetime();
                now.day = day;
                now.month = month;
                now.year = year;
                now.weekday = weekday;
                self.set_clock(now);
                Reply::Ok
            }
            Command::Time { time, correction } => {
                if let Some(time) = time {
                    let mut now = self.rtc.read_datetime();
                    now.set_time(time);
                    self.set_clock(now);
                }
                match correction {
                    Some(correction) => {
                        self.state.settings.correction = correction;
                        self.commit()
                    }
                    None => Reply::Ok,
                }
            }
            Command::HeatLimits { low, high } => {
                self.state.settings.heat.low = low;
                self.state.settings.heat.high = high;
                self.commit()
            }
            Command::Heat(switch) => {
                self.apply_heat_override(switch.into());
                self.commit()
            }
            Command::LightSchedule { on, off, dimming } => {
                let light = &mut self.state.settings.light;
                light.on = on;
                light.off = off;
                if let Some((level, rise)) = dimming {
                    light.level = level;
                    light.rise = rise;
                    self.retarget_light();
                }
                self.commit()
            }
            Command::Light(switch) => {
                self.apply_light_override(switch.into());
                self.commit()
            }
            Command::LightLevel(level) => {
                self.state.settings.light.level = level;
                self.retarget_light();
                self.commit()
            }
            Command::LightRise(rise) => {
                self.state.settings.light.rise = rise;
                self.retarget_light();
                self.commit()
            }
            Command::Display(mode) => {
                self.state.settings.display = mode;
                self.screen.release();
                self.refresh_display();
                self.commit()
            }
        };

        out.write_str(reply.as_str())?;
        Ok(Flow::Continue)
    }

    fn commit(&mut self) -> Reply {
        match self.persist() {
            Ok(()) => Reply::Ok,
            Err(_) => Reply::Error,
        }
    }

    fn write_status<W: uWrite>(&mut self, out: &mut W) -> Result<(), W::Error> {
        let now = self.rtc.read_datetime();
        let settings = self.state.settings;
        let correction = settings.correction;
        let light = settings.light;
        let fade = self.dimmer.status();

        uwrite!(
            out,
            "Date: {}.{}.{} {}\r\n",
            Padded(now.day),
            Padded(now.month),
            Padded(now.year),
            weekday_name(now.weekday)
        )?;
        uwrite!(
            out,
            "Time: {} ({}{} sec at {})\r\n",
            Clock(now.time()),
            sign_str(correction.sign),
            correction.seconds,
            Clock(self.state.adjusted.time())
        )?;
        match self.state.temperature {
            Temperature::Celsius(value) => uwrite!(out, "Temp: {}\r\n", value)?,
            Temperature::Unknown => out.write_str("Temp: --\r\n")?,
        }
        uwrite!(
            out,
            "Heat: {} {} ({}-{})\r\n",
            on_off(self.heater.is_on()),
            mode_name(settings.heat.mode),
            settings.heat.low,
            settings.heat.high
        )?;
        uwrite!(
            out,
            "Light: {} {} ({}-{}) {}/{}% {}min\r\n",
            on_off(fade.rising),
            mode_name(light.mode),
            Clock(light.on),
            Clock(light.off),
            fade.level,
            light.level,
            light.rise
        )?;
        let display = match settings.display {
            DisplayMode::Time => "time",
            DisplayMode::Temperature => "temp",
        };
        uwrite!(out, "Display: {}\r\n", display)
    }
}

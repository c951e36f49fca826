//! Time task and daily drift correction

use log::debug;

use super::datetime::DateTime;
use super::state::{Correction, DisplayMode, Sign};
use super::{Aquarium, Board};
use crate::drivers::Rtc;

/// Apply the daily correction to `now` if a new day has passed `adjusted`
///
/// The correction fires once the calendar date is later than the remembered
/// one and the time of day has moved past the remembered time. `adjusted`
/// then takes the new date, so a second call on the same day is a no-op.
pub fn apply_daily_correction(
    now: &mut DateTime,
    adjusted: &mut DateTime,
    correction: Correction,
) -> bool {
    if now.date() <= adjusted.date() || now.time() <= adjusted.time() {
        return false;
    }

    match correction.sign {
        Sign::Plus => now.add_time(correction.span()),
        Sign::Minus => now.sub_time(correction.span()),
    }
    adjusted.set_date_from(now);
    true
}

impl<B: Board> Aquarium<B> {
    /// Read the clock, correct its drift once a day, refresh a time display
    pub fn process_time(&mut self) {
        let state = &mut self.state;
        state.now = self.rtc.read_datetime();

        let correction = state.settings.correction;
        if apply_daily_correction(&mut state.now, &mut state.adjusted, correction) {
            debug!(
                "clock corrected by {}{}s",
                correction.sign.to_byte() as char,
                correction.seconds
            );
            if correction.seconds > 0 {
                self.rtc.write_datetime(&state.now);
            }
            self.rtc.write_scratch(&state.adjusted);
        }

        if state.settings.display == DisplayMode::Time {
            self.screen.show_time(&state.now);
        }
    }

    /// Set the clock and make it the new correction reference
    pub(crate) fn set_clock(&mut self, now: DateTime) {
        self.state.now = now;
        self.state.adjusted = now;
        self.rtc.write_datetime(&now);
        self.rtc.write_scratch(&now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aquarium::datetime::{HourMode, TimeOfDay};
    use crate::drivers::FadeEngine;
    use crate::testing::{self, TestBoard};

    fn at(year: u8, month: u8, day: u8, weekday: u8, hour: u8, min: u8, sec: u8) -> DateTime {
        DateTime {
            sec,
            min,
            hour,
            hour_mode: HourMode::H24,
            weekday,
            day,
            month,
            year,
        }
    }

    const PLUS_3: Correction = Correction {
        sign: Sign::Plus,
        seconds: 3,
    };

    #[test]
    fn corrects_once_per_day() {
        let mut adjusted = at(24, 5, 1, 3, 10, 0, 0);
        let mut now = at(24, 5, 2, 4, 10, 0, 1);

        assert!(apply_daily_correction(&mut now, &mut adjusted, PLUS_3));
        assert_eq!(now.time(), TimeOfDay::new(10, 0, 4));
        assert_eq!(adjusted.date(), now.date());
        assert_eq!(adjusted.weekday, 4);
        assert_eq!(adjusted.time(), TimeOfDay::new(10, 0, 0));

        let snapshot = now;
        assert!(!apply_daily_correction(&mut now, &mut adjusted, PLUS_3));
        assert_eq!(now, snapshot);
    }

    #[test]
    fn waits_for_the_remembered_time_of_day() {
        let mut adjusted = at(24, 5, 1, 3, 10, 0, 0);
        let mut now = at(24, 5, 2, 4, 10, 0, 0);
        assert!(!apply_daily_correction(&mut now, &mut adjusted, PLUS_3));

        let mut early = at(24, 5, 3, 5, 9, 0, 0);
        assert!(!apply_daily_correction(&mut early, &mut adjusted, PLUS_3));
    }

    #[test]
    fn correction_rolls_over_the_century() {
        let mut adjusted = at(99, 12, 30, 4, 12, 0, 0);
        let mut now = at(99, 12, 31, 5, 23, 59, 58);

        assert!(apply_daily_correction(&mut now, &mut adjusted, PLUS_3));
        assert_eq!(now, at(0, 1, 1, 6, 0, 0, 1));
        assert_eq!(adjusted, at(0, 1, 1, 6, 12, 0, 0));
    }

    #[test]
    fn negative_correction_sets_the_clock_back() {
        let mut adjusted = at(24, 5, 1, 3, 10, 0, 0);
        let mut now = at(24, 5, 2, 4, 11, 0, 0);
        let minus = Correction {
            sign: Sign::Minus,
            seconds: 30,
        };
        assert!(apply_daily_correction(&mut now, &mut adjusted, minus));
        assert_eq!(now.time(), TimeOfDay::new(10, 59, 30));
    }

    #[test]
    fn time_task_writes_corrected_clock_and_scratch() {
        static FADE: FadeEngine = FadeEngine::new();
        let mut aquarium = testing::aquarium(&FADE);
        aquarium.state.settings.correction = PLUS_3;
        aquarium.rtc.scratch = at(24, 5, 1, 3, 10, 0, 0);
        aquarium.state.adjusted = aquarium.rtc.scratch;
        aquarium.rtc.now = at(24, 5, 2, 4, 10, 30, 0);

        aquarium.process_time();
        assert_eq!(aquarium.rtc.now.time(), TimeOfDay::new(10, 30, 3));
        assert_eq!(aquarium.rtc.scratch.date(), aquarium.rtc.now.date());
        assert_eq!(aquarium.rtc.writes, 1);

        aquarium.process_time();
        assert_eq!(aquarium.rtc.writes, 1);
        assert_eq!(
            aquarium.screen.display().frame,
            Some(crate::drivers::Frame::time(10, 30, 3))
        );
    }

    #[test]
    fn boot_recalls_correction_point_from_scratch() {
        static FADE: FadeEngine = FadeEngine::new();
        let board = testing::peripherals();
        let mut rtc = board.rtc;
        rtc.scratch = at(24, 1, 1, 1, 6, 0, 0);
        let aquarium = crate::aquarium::Aquarium::<TestBoard>::new(
            &FADE,
            crate::aquarium::Peripherals { rtc, ..board },
        )
        .unwrap();
        assert_eq!(aquarium.state().adjusted, at(24, 1, 1, 1, 6, 0, 0));
    }
}

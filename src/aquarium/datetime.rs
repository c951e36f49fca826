//! Calendar arithmetic on the RTC's two-digit-year date-time record
//!
//! Years run from 00 to 99 (the DS1302 epoch). Every year divisible by four
//! is a leap year, which makes year 00 a leap year as well.

const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// 12/24 hour flag stored alongside the hour by the RTC
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HourMode {
    #[default]
    H24,
    Am,
    Pm,
}

/// Time of day, ordered hour first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, min: u8, sec: u8) -> Self {
        Self { hour, min, sec }
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24 && self.min < 60 && self.sec < 60
    }
}

/// Calendar date, ordered year first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Date {
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateTime {
    pub sec: u8,
    pub min: u8,
    pub hour: u8,
    pub hour_mode: HourMode,
    /// 1 = Monday .. 7 = Sunday
    pub weekday: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

pub fn is_leap_year(year: u8) -> bool {
    year % 4 == 0
}

pub fn days_in_month(month: u8, year: u8) -> u8 {
    let month = month.clamp(1, 12);
    let days = DAYS_IN_MONTH[month as usize];
    if month == 2 && is_leap_year(year) {
        days + 1
    } else {
        days
    }
}

pub fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "?",
    }
}

impl DateTime {
    pub fn date(&self) -> Date {
        Date {
            year: self.year,
            month: self.month,
            day: self.day,
        }
    }

    pub fn time(&self) -> TimeOfDay {
        TimeOfDay::new(self.hour, self.min, self.sec)
    }

    pub fn set_time(&mut self, time: TimeOfDay) {
        self.hour = time.hour;
        self.min = time.min;
        self.sec = time.sec;
        self.hour_mode = HourMode::H24;
    }

    /// Copy the calendar part (including weekday) of `other`, keeping our time
    pub fn set_date_from(&mut self, other: &DateTime) {
        self.year = other.year;
        self.month = other.month;
        self.day = other.day;
        self.weekday = other.weekday;
    }

    /// Add a time span shorter than one day, carrying into the date
    pub fn add_time(&mut self, span: TimeOfDay) {
        let mut carry = 0;

        self.sec += span.sec;
        if self.sec >= 60 {
            self.sec -= 60;
            carry = 1;
        }

        self.min += span.min + carry;
        carry = 0;
        if self.min >= 60 {
            self.min -= 60;
            carry = 1;
        }

        self.hour += span.hour + carry;
        if self.hour >= 24 {
            self.hour -= 24;
            self.next_day();
        }
    }

    /// Subtract a time span shorter than one day, borrowing from the date
    pub fn sub_time(&mut self, span: TimeOfDay) {
        let mut borrow = 0;

        if self.sec < span.sec {
            self.sec = self.sec + 60 - span.sec;
            borrow = 1;
        } else {
            self.sec -= span.sec;
        }

        let need = span.min + borrow;
        borrow = 0;
        if self.min < need {
            self.min = self.min + 60 - need;
            borrow = 1;
        } else {
            self.min -= need;
        }

        let need = span.hour + borrow;
        if self.hour < need {
            self.hour = self.hour + 24 - need;
            self.previous_day();
        } else {
            self.hour -= need;
        }
    }

    fn next_day(&mut self) {
        self.weekday = if self.weekday >= 7 { 1 } else { self.weekday + 1 };

        self.day += 1;
        if self.day > days_in_month(self.month, self.year) {
            self.day = 1;
            self.month += 1;
        }

        if self.month > 12 {
            self.month = 1;
            self.year = if self.year >= 99 { 0 } else { self.year + 1 };
        }
    }

    fn previous_day(&mut self) {
        self.weekday = if self.weekday <= 1 { 7 } else { self.weekday - 1 };

        if self.day > 1 {
            self.day -= 1;
            return;
        }

        if self.month > 1 {
            self.month -= 1;
        } else {
            self.month = 12;
            self.year = if self.year == 0 { 99 } else { self.year - 1 };
        }
        self.day = days_in_month(self.month, self.year);
    }
}

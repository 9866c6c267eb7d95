//! # Temporal Value Types
//!
//! Calendar values produced by the temporal codec and accepted by the value
//! encoder.
//!
//! | Type        | Fields                                   | Text form                          |
//! |-------------|------------------------------------------|------------------------------------|
//! | `Date`      | year, month, day                         | `YYYY-MM-DD`                       |
//! | `Time`      | h, m, s, nanos, optional UTC offset      | `HH:MM:SS[.fraction][±HH:MM]`      |
//! | `Timestamp` | Date + Time, or an infinity marker       | `YYYY-MM-DD HH:MM:SS[.fraction]`   |
//! | `Interval`  | months, days, micros                     | `N months N days N micros`         |
//!
//! `Time` keeps a single nanosecond field internally but may be constructed
//! from exactly one of milliseconds, microseconds or nanoseconds. Supplying
//! more than one is contradictory and fails with `InvalidTemporalValue`.
//!
//! An infinite `Timestamp` carries no date or time payload.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use eyre::Result;

use crate::config::{MICROS_PER_DAY, TIME_TZ_MAX_OFFSET};
use crate::error::CodecError;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_CE_DAYS: i32 = 719_163;

const NANOS_PER_MICRO: u32 = 1_000;
const NANOS_PER_MILLI: u32 = 1_000_000;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Sub-second resolution of a timestamp variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePrecision {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    year: i32,
    month: u8,
    day: u8,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month as u32, day as u32).is_none() {
            return Err(CodecError::temporal(format!(
                "{:04}-{:02}-{:02} is not a calendar date",
                year, month, day
            ))
            .into());
        }
        Ok(Self { year, month, day })
    }

    /// Date `days` after 1970-01-01.
    pub fn from_days(days: i32) -> Result<Self> {
        let date = days
            .checked_add(UNIX_EPOCH_CE_DAYS)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or_else(|| CodecError::temporal(format!("day {} is outside the calendar", days)))?;
        Ok(Self::from_naive(date))
    }

    /// Days since 1970-01-01.
    pub fn to_days(&self) -> i32 {
        self.to_naive().num_days_from_ce() - UNIX_EPOCH_CE_DAYS
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }

    pub fn to_naive(&self) -> NaiveDate {
        // fields were validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year < 0 {
            write!(f, "-{:04}-{:02}-{:02}", -(self.year as i64), self.month, self.day)
        } else {
            write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

impl FromStr for Date {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CodecError::temporal(format!("'{}' is not a date", s));
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let mut parts = body.splitn(3, '-');
        let mut next = || -> Result<i64> {
            parts
                .next()
                .and_then(|p| p.parse::<i64>().ok())
                .ok_or_else(|| invalid().into())
        };
        let year = next()?;
        let month = next()?;
        let day = next()?;
        let year = if negative { -year } else { year };
        let year = i32::try_from(year).map_err(|_| invalid())?;
        let month = u8::try_from(month).map_err(|_| invalid())?;
        let day = u8::try_from(day).map_err(|_| invalid())?;
        Date::new(year, month, day)
    }
}

/// Time of day with an optional UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    hour: u8,
    minute: u8,
    second: u8,
    nanos: u32,
    offset: Option<i32>,
}

impl Time {
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self> {
        Self::from_parts(hour, minute, second, None, None, None)
    }

    /// Builds a time from at most one sub-second field.
    pub fn from_parts(
        hour: u8,
        minute: u8,
        second: u8,
        millis: Option<u32>,
        micros: Option<u32>,
        nanos: Option<u32>,
    ) -> Result<Self> {
        let supplied = [millis.is_some(), micros.is_some(), nanos.is_some()]
            .iter()
            .filter(|s| **s)
            .count();
        if supplied > 1 {
            return Err(CodecError::temporal("only one second fraction is allowed").into());
        }

        let nanos = match (millis, micros, nanos) {
            (Some(ms), _, _) if ms < 1_000 => ms * NANOS_PER_MILLI,
            (_, Some(us), _) if us < 1_000_000 => us * NANOS_PER_MICRO,
            (_, _, Some(ns)) if ns < NANOS_PER_SECOND => ns,
            (None, None, None) => 0,
            _ => return Err(CodecError::temporal("second fraction out of range").into()),
        };

        let end_of_day = hour == 24 && minute == 0 && second == 0 && nanos == 0;
        if !(hour < 24 || end_of_day) || minute > 59 || second > 59 {
            return Err(CodecError::temporal(format!(
                "{:02}:{:02}:{:02} is not a time of day",
                hour, minute, second
            ))
            .into());
        }

        Ok(Self {
            hour,
            minute,
            second,
            nanos,
            offset: None,
        })
    }

    /// Time `micros` after midnight. `MICROS_PER_DAY` maps to `24:00:00`.
    pub fn from_micros(micros: i64) -> Result<Self> {
        if !(0..=MICROS_PER_DAY).contains(&micros) {
            return Err(CodecError::temporal(format!(
                "{} microseconds is not a time of day",
                micros
            ))
            .into());
        }
        let seconds = micros / 1_000_000;
        let fraction = (micros % 1_000_000) as u32;
        Self::from_parts(
            (seconds / 3600) as u8,
            (seconds / 60 % 60) as u8,
            (seconds % 60) as u8,
            None,
            Some(fraction),
            None,
        )
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
            nanos: time.nanosecond() % NANOS_PER_SECOND,
            offset: None,
        }
    }

    /// Attaches a UTC offset in seconds, marking the time as zoned.
    pub fn with_offset(mut self, offset_seconds: i32) -> Result<Self> {
        if offset_seconds.abs() > TIME_TZ_MAX_OFFSET {
            return Err(CodecError::temporal(format!(
                "UTC offset {}s exceeds {}s",
                offset_seconds, TIME_TZ_MAX_OFFSET
            ))
            .into());
        }
        self.offset = Some(offset_seconds);
        Ok(self)
    }

    /// Replaces the sub-second part with `nanos`.
    pub fn with_nanos(mut self, nanos: u32) -> Result<Self> {
        if nanos >= NANOS_PER_SECOND {
            return Err(CodecError::temporal("second fraction out of range").into());
        }
        self.nanos = nanos;
        Ok(self)
    }

    /// Microseconds after midnight, sub-microsecond digits truncated.
    pub fn to_micros(&self) -> i64 {
        (self.hour as i64 * 3600 + self.minute as i64 * 60 + self.second as i64) * 1_000_000
            + (self.nanos / NANOS_PER_MICRO) as i64
    }

    pub fn to_naive(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_nano_opt(
            self.hour as u32,
            self.minute as u32,
            self.second as u32,
            self.nanos,
        )
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn millis(&self) -> u32 {
        self.nanos / NANOS_PER_MILLI
    }

    pub fn micros(&self) -> u32 {
        self.nanos / NANOS_PER_MICRO
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Nanoseconds below microsecond resolution.
    pub fn remainder_nanos(&self) -> u32 {
        self.nanos % NANOS_PER_MICRO
    }

    pub fn offset(&self) -> Option<i32> {
        self.offset
    }

    pub fn is_timezoned(&self) -> bool {
        self.offset.is_some()
    }
}

fn write_fraction(f: &mut fmt::Formatter<'_>, nanos: u32) -> fmt::Result {
    if nanos == 0 {
        return Ok(());
    }
    let digits = format!("{:09}", nanos);
    write!(f, ".{}", digits.trim_end_matches('0'))
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        write_fraction(f, self.nanos)?;
        if let Some(offset) = self.offset {
            let sign = if offset < 0 { '-' } else { '+' };
            let abs = offset.unsigned_abs();
            write!(f, "{}{:02}:{:02}", sign, abs / 3600, abs / 60 % 60)?;
            if abs % 60 != 0 {
                write!(f, ":{:02}", abs % 60)?;
            }
        }
        Ok(())
    }
}

fn parse_fraction(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded = format!("{:0<9}", digits);
    padded.parse().ok()
}

fn parse_offset(text: &str) -> Option<i32> {
    let (sign, body) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let mut total = 0i32;
    for (i, part) in body.split(':').enumerate() {
        let value: i32 = part.parse().ok()?;
        total += match i {
            0 => value * 3600,
            1 => value * 60,
            2 => value,
            _ => return None,
        };
    }
    Some(sign * total)
}

impl FromStr for Time {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CodecError::temporal(format!("'{}' is not a time", s));
        let (clock, offset) = match s.find(['+', '-']) {
            Some(pos) => (&s[..pos], Some(parse_offset(&s[pos..]).ok_or_else(invalid)?)),
            None => (s, None),
        };
        let (hms, fraction) = match clock.split_once('.') {
            Some((hms, frac)) => (hms, Some(parse_fraction(frac).ok_or_else(invalid)?)),
            None => (clock, None),
        };
        let fields: Vec<u8> = hms
            .split(':')
            .map(|p| p.parse::<u8>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid())?;
        if fields.len() != 3 {
            return Err(invalid().into());
        }
        let time = Time::from_parts(fields[0], fields[1], fields[2], None, None, fraction)?;
        match offset {
            Some(offset) => time.with_offset(offset),
            None => Ok(time),
        }
    }
}

/// Date and time, or one of the two infinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    NegativeInfinity,
    Finite { date: Date, time: Time },
    PositiveInfinity,
}

impl Timestamp {
    pub fn new(date: Date, time: Time) -> Self {
        Timestamp::Finite { date, time }
    }

    /// Builds a timestamp whose time carries the fraction of `precision`.
    ///
    /// `nanos` replaces the sub-second part and is only accepted with
    /// nanosecond precision.
    pub fn from_datetime(
        datetime: NaiveDateTime,
        precision: TimePrecision,
        nanos: Option<u32>,
    ) -> Result<Self> {
        if nanos.is_some() && precision != TimePrecision::Nanoseconds {
            return Err(CodecError::temporal(
                "nanoseconds are only supported with nanosecond precision",
            )
            .into());
        }
        let (h, m, s) = (
            datetime.hour() as u8,
            datetime.minute() as u8,
            datetime.second() as u8,
        );
        let sub = datetime.nanosecond() % NANOS_PER_SECOND;
        let time = match precision {
            TimePrecision::Seconds => Time::new(h, m, s)?,
            TimePrecision::Milliseconds => {
                Time::from_parts(h, m, s, Some(sub / NANOS_PER_MILLI), None, None)?
            }
            TimePrecision::Microseconds => {
                Time::from_parts(h, m, s, None, Some(sub / NANOS_PER_MICRO), None)?
            }
            TimePrecision::Nanoseconds => {
                Time::from_parts(h, m, s, None, None, Some(nanos.unwrap_or(sub)))?
            }
        };
        Ok(Timestamp::Finite {
            date: Date::from_naive(datetime.date()),
            time,
        })
    }

    /// `-1`, `0` or `+1`.
    pub fn infinity(&self) -> i8 {
        match self {
            Timestamp::NegativeInfinity => -1,
            Timestamp::Finite { .. } => 0,
            Timestamp::PositiveInfinity => 1,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Timestamp::Finite { .. })
    }

    pub fn date(&self) -> Option<&Date> {
        match self {
            Timestamp::Finite { date, .. } => Some(date),
            _ => None,
        }
    }

    pub fn time(&self) -> Option<&Time> {
        match self {
            Timestamp::Finite { time, .. } => Some(time),
            _ => None,
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Finite { date, time } => {
                Some(NaiveDateTime::new(date.to_naive(), time.to_naive()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::NegativeInfinity => f.write_str("-infinity"),
            Timestamp::PositiveInfinity => f.write_str("+infinity"),
            Timestamp::Finite { date, time } => write!(f, "{} {}", date, time),
        }
    }
}

impl FromStr for Timestamp {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "-infinity" => return Ok(Timestamp::NegativeInfinity),
            "+infinity" | "infinity" => return Ok(Timestamp::PositiveInfinity),
            _ => {}
        }
        let trimmed = s.trim();
        let (date, time) = trimmed
            .split_once([' ', 'T'])
            .ok_or_else(|| CodecError::temporal(format!("'{}' is not a timestamp", s)))?;
        Ok(Timestamp::Finite {
            date: date.parse()?,
            time: time.parse()?,
        })
    }
}

/// Calendar-aware duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl Interval {
    pub fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months,
            days,
            micros,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} months {} days {} microseconds",
            self.months, self.days, self.micros
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codec_error;

    #[test]
    fn time_rejects_two_sub_second_fields() {
        let err = Time::from_parts(1, 2, 3, Some(4), Some(5), None).unwrap_err();
        assert!(matches!(
            codec_error(&err),
            Some(CodecError::InvalidTemporalValue { .. })
        ));
    }

    #[test]
    fn time_normalizes_fraction_to_nanos() {
        let millis = Time::from_parts(0, 0, 1, Some(5), None, None).unwrap();
        let micros = Time::from_parts(0, 0, 1, None, Some(5_000), None).unwrap();
        assert_eq!(millis, micros);
        assert_eq!(millis.nanos(), 5_000_000);
    }

    #[test]
    fn time_display_trims_fraction_and_renders_offset() {
        let time = Time::from_parts(13, 45, 30, None, Some(123_450), None)
            .unwrap()
            .with_offset(-(5 * 3600 + 30 * 60))
            .unwrap();
        assert_eq!(time.to_string(), "13:45:30.12345-05:30");
    }

    #[test]
    fn time_from_micros_round_trips() {
        let time = Time::from_micros(49_530_123_456).unwrap();
        assert_eq!(time.to_string(), "13:45:30.123456");
        assert_eq!(time.to_micros(), 49_530_123_456);
    }

    #[test]
    fn time_accepts_end_of_day() {
        assert_eq!(Time::from_micros(MICROS_PER_DAY).unwrap().to_string(), "24:00:00");
        assert!(Time::from_micros(MICROS_PER_DAY + 1).is_err());
    }

    #[test]
    fn date_days_since_epoch() {
        assert_eq!(Date::new(2024, 2, 29).unwrap().to_days(), 19_782);
        assert_eq!(Date::new(1521, 4, 23).unwrap().to_days(), -163_882);
        assert_eq!(Date::from_days(0).unwrap().to_string(), "1970-01-01");
    }

    #[test]
    fn date_rejects_non_calendar_dates() {
        assert!(Date::new(2023, 2, 29).is_err());
        assert!(Date::new(2023, 13, 1).is_err());
    }

    #[test]
    fn timestamp_infinity_string_round_trip() {
        for text in ["-infinity", "+infinity"] {
            let ts: Timestamp = text.parse().unwrap();
            assert!(!ts.is_finite());
            assert!(ts.date().is_none());
            assert_eq!(ts.to_string(), text);
        }
        assert_eq!("-infinity".parse::<Timestamp>().unwrap().infinity(), -1);
        assert_eq!("infinity".parse::<Timestamp>().unwrap().infinity(), 1);
    }

    #[test]
    fn timestamp_parses_fraction() {
        let ts: Timestamp = "2023-11-14 22:13:20.123456".parse().unwrap();
        assert_eq!(ts.time().unwrap().micros(), 123_456);
        assert_eq!(ts.to_string(), "2023-11-14 22:13:20.123456");
    }

    #[test]
    fn from_datetime_rejects_nanos_without_nanosecond_precision() {
        let dt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(Timestamp::from_datetime(dt, TimePrecision::Microseconds, Some(5)).is_err());
        let ts = Timestamp::from_datetime(dt, TimePrecision::Nanoseconds, Some(5)).unwrap();
        assert_eq!(ts.time().unwrap().remainder_nanos(), 5);
    }

    #[test]
    fn from_datetime_truncates_to_precision() {
        let dt = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_nano_opt(1, 2, 3, 123_456_789)
            .unwrap();
        let ms = Timestamp::from_datetime(dt, TimePrecision::Milliseconds, None).unwrap();
        assert_eq!(ms.to_string(), "2020-01-01 01:02:03.123");
        let s = Timestamp::from_datetime(dt, TimePrecision::Seconds, None).unwrap();
        assert_eq!(s.to_string(), "2020-01-01 01:02:03");
    }
}

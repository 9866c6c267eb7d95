//! # Temporal Codec
//!
//! Converts the engine's integer encodings of dates, times and timestamps to
//! calendar values and back.
//!
//! | Logical type   | Slot                      | Decoding                                   |
//! |----------------|---------------------------|--------------------------------------------|
//! | DATE           | i32 days since epoch      | calendar date                              |
//! | TIME           | i64 micros since midnight | time of day                                |
//! | TIME_TZ        | packed u64                | time of day + UTC offset                   |
//! | TIMESTAMP(_TZ) | i64 micros since epoch    | sentinels first, then date + time          |
//! | TIMESTAMP_S    | i64 seconds since epoch   | epoch + offset, chunked                    |
//! | TIMESTAMP_MS   | i64 millis since epoch    | epoch + offset, chunked                    |
//! | TIMESTAMP_NS   | i64 nanos since epoch     | epoch + millis (chunked) + sub-milli nanos |
//!
//! ## Chunked Offsets
//!
//! Offsets whose magnitude reaches the configured digit limit are applied to
//! the epoch as a sequence of fixed steps followed by the remainder:
//!
//! ```text
//! offset = q * step + r      (q, r truncated toward zero, same sign)
//! epoch  + step + step + ... (q times) + r
//! ```
//!
//! Only the plain microsecond encodings carry the `±infinity` sentinels.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike, Utc};
use eyre::Result;

use crate::abi::{pack_time_tz, unpack_time_tz};
use crate::config::{
    CalendarLimits, MICROS_PER_DAY, MICROS_PER_SECOND, NANOS_PER_MILLI, NANOS_PER_SECOND,
    TIMESTAMP_NEG_INFINITY, TIMESTAMP_POS_INFINITY,
};
use crate::error::CodecError;
use crate::types::{Date, Time, TimePrecision, Timestamp};

/// Unit of an epoch offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochUnit {
    Seconds,
    Milliseconds,
}

impl EpochUnit {
    fn delta(&self, amount: i64) -> Option<TimeDelta> {
        match self {
            EpochUnit::Seconds => TimeDelta::try_seconds(amount),
            EpochUnit::Milliseconds => TimeDelta::try_milliseconds(amount),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EpochUnit::Seconds => "seconds",
            EpochUnit::Milliseconds => "milliseconds",
        }
    }
}

fn epoch() -> NaiveDateTime {
    DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

fn add_units(datetime: NaiveDateTime, amount: i64, unit: EpochUnit) -> Result<NaiveDateTime> {
    unit.delta(amount)
        .and_then(|delta| datetime.checked_add_signed(delta))
        .ok_or_else(|| {
            CodecError::temporal(format!(
                "adding {} {} leaves the supported calendar range",
                amount,
                unit.name()
            ))
            .into()
        })
}

/// `1970-01-01 00:00:00` plus `offset` units, chunked per `limits`.
pub fn apply_epoch_offset(
    offset: i64,
    unit: EpochUnit,
    limits: CalendarLimits,
) -> Result<NaiveDateTime> {
    if !limits.needs_chunking(offset) {
        return add_units(epoch(), offset, unit);
    }

    let step = if offset < 0 { -limits.step() } else { limits.step() };
    let quotient = offset / step;
    let remainder = offset % step;

    tracing::trace!(offset, steps = quotient, remainder, "applying epoch offset in steps");

    let mut datetime = epoch();
    for _ in 0..quotient {
        datetime = add_units(datetime, step, unit)?;
    }
    add_units(datetime, remainder, unit)
}

pub fn decode_date(days: i32) -> Result<Date> {
    Date::from_days(days)
}

pub fn encode_date(date: &Date) -> i32 {
    date.to_days()
}

pub fn decode_time(micros: i64) -> Result<Time> {
    Time::from_micros(micros)
}

pub fn encode_time(time: &Time) -> i64 {
    time.to_micros()
}

pub fn decode_time_tz(bits: u64) -> Result<Time> {
    let (micros, offset) = unpack_time_tz(bits);
    Time::from_micros(micros)?.with_offset(offset)
}

/// Packs a time with its offset, zero when the time carries none.
pub fn encode_time_tz(time: &Time) -> u64 {
    pack_time_tz(time.to_micros(), time.offset().unwrap_or(0))
}

/// Decodes a microsecond timestamp, honouring the infinity sentinels.
pub fn decode_timestamp(micros: i64, timezoned: bool) -> Result<Timestamp> {
    match micros {
        TIMESTAMP_NEG_INFINITY => return Ok(Timestamp::NegativeInfinity),
        TIMESTAMP_POS_INFINITY => return Ok(Timestamp::PositiveInfinity),
        _ => {}
    }

    let days = micros.div_euclid(MICROS_PER_DAY);
    let days = i32::try_from(days)
        .map_err(|_| CodecError::temporal(format!("timestamp {} is outside the calendar", micros)))?;
    let date = Date::from_days(days)?;
    let time = Time::from_micros(micros.rem_euclid(MICROS_PER_DAY))?;
    let time = if timezoned { time.with_offset(0)? } else { time };
    Ok(Timestamp::new(date, time))
}

pub fn decode_timestamp_s(seconds: i64, limits: CalendarLimits) -> Result<Timestamp> {
    let datetime = apply_epoch_offset(seconds, EpochUnit::Seconds, limits)?;
    Timestamp::from_datetime(datetime, TimePrecision::Seconds, None)
}

pub fn decode_timestamp_ms(millis: i64, limits: CalendarLimits) -> Result<Timestamp> {
    let datetime = apply_epoch_offset(millis, EpochUnit::Milliseconds, limits)?;
    Timestamp::from_datetime(datetime, TimePrecision::Milliseconds, None)
}

/// Decodes a nanosecond timestamp. The calendar part is computed at
/// millisecond resolution and the sub-millisecond nanos are carried over.
pub fn decode_timestamp_ns(nanos: i64, limits: CalendarLimits) -> Result<Timestamp> {
    let millis = nanos.div_euclid(NANOS_PER_MILLI);
    let sub_milli = nanos.rem_euclid(NANOS_PER_MILLI) as u32;
    let datetime = apply_epoch_offset(millis, EpochUnit::Milliseconds, limits)?;
    let nanos_of_second = datetime.nanosecond() + sub_milli;
    Timestamp::from_datetime(datetime, TimePrecision::Nanoseconds, Some(nanos_of_second))
}

fn finite_parts(timestamp: &Timestamp) -> Option<(&Date, &Time)> {
    match timestamp {
        Timestamp::Finite { date, time } => Some((date, time)),
        _ => None,
    }
}

/// Microseconds since the epoch, infinities mapped to their sentinels.
pub fn encode_timestamp(timestamp: &Timestamp) -> Result<i64> {
    let (date, time) = match timestamp {
        Timestamp::NegativeInfinity => return Ok(TIMESTAMP_NEG_INFINITY),
        Timestamp::PositiveInfinity => return Ok(TIMESTAMP_POS_INFINITY),
        Timestamp::Finite { date, time } => (date, time),
    };
    (date.to_days() as i64)
        .checked_mul(MICROS_PER_DAY)
        .and_then(|micros| micros.checked_add(time.to_micros()))
        .filter(|micros| *micros != TIMESTAMP_NEG_INFINITY && *micros != TIMESTAMP_POS_INFINITY)
        .ok_or_else(|| CodecError::out_of_range("TIMESTAMP", timestamp).into())
}

/// Nanoseconds since the epoch. Infinite timestamps have no nanosecond form.
pub fn encode_timestamp_ns(timestamp: &Timestamp) -> Result<i64> {
    let (date, time) = finite_parts(timestamp).ok_or_else(|| {
        CodecError::temporal(format!("{} has no nanosecond representation", timestamp))
    })?;
    let seconds = date.to_days() as i64 * 86_400
        + time.hour() as i64 * 3600
        + time.minute() as i64 * 60
        + time.second() as i64;
    seconds
        .checked_mul(NANOS_PER_SECOND)
        .and_then(|nanos| nanos.checked_add(time.nanos() as i64))
        .ok_or_else(|| CodecError::out_of_range("TIMESTAMP_NS", timestamp).into())
}

/// Converts a microsecond timestamp slot value to seconds, flooring.
pub fn micros_to_seconds(micros: i64) -> i64 {
    micros.div_euclid(MICROS_PER_SECOND)
}

/// Converts a microsecond timestamp slot value to milliseconds, flooring.
pub fn micros_to_millis(micros: i64) -> i64 {
    micros.div_euclid(1_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(ts: Result<Timestamp>) -> String {
        ts.unwrap().to_string()
    }

    #[test]
    fn microsecond_sentinels_are_infinities() {
        let neg = decode_timestamp(i64::MIN + 1, false).unwrap();
        let pos = decode_timestamp(i64::MAX, false).unwrap();
        assert_eq!(neg.infinity(), -1);
        assert_eq!(pos.infinity(), 1);
        assert_eq!(neg.to_string(), "-infinity");
        assert_eq!(pos.to_string(), "+infinity");
        assert!(neg.date().is_none());
    }

    #[test]
    fn epoch_zero_decodes_to_unix_epoch() {
        assert_eq!(render(decode_timestamp(0, false)), "1970-01-01 00:00:00");
    }

    #[test]
    fn negative_micros_floor_into_previous_day() {
        assert_eq!(render(decode_timestamp(-1, false)), "1969-12-31 23:59:59.999999");
    }

    #[test]
    fn microsecond_timestamp_keeps_fraction() {
        assert_eq!(
            render(decode_timestamp(1_700_000_000_123_456, false)),
            "2023-11-14 22:13:20.123456"
        );
    }

    #[test]
    fn timezoned_timestamp_carries_utc_offset() {
        let ts = decode_timestamp(0, true).unwrap();
        assert_eq!(ts.time().unwrap().offset(), Some(0));
    }

    #[test]
    fn second_and_milli_precision() {
        let limits = CalendarLimits::default();
        assert_eq!(
            render(decode_timestamp_s(1_700_000_000, limits)),
            "2023-11-14 22:13:20"
        );
        assert_eq!(
            render(decode_timestamp_ms(1_700_000_000_123, limits)),
            "2023-11-14 22:13:20.123"
        );
    }

    #[test]
    fn fifteen_digit_milliseconds_are_chunked() {
        let limits = CalendarLimits::default();
        assert!(limits.needs_chunking(100_000_000_000_000));
        assert_eq!(
            render(decode_timestamp_ms(100_000_000_000_000, limits)),
            "5138-11-16 09:46:40"
        );
        assert_eq!(
            render(decode_timestamp_ms(-50_000_000_000_000, limits)),
            "0385-07-25 07:06:40"
        );
    }

    #[test]
    fn chunked_and_direct_application_agree() {
        let tight = CalendarLimits::new(4, 999).unwrap();
        let loose = CalendarLimits::default();
        for offset in [123_456i64, -1_234_567, 10_000, -9_999, 998] {
            let chunked = apply_epoch_offset(offset, EpochUnit::Milliseconds, tight).unwrap();
            let direct = apply_epoch_offset(offset, EpochUnit::Milliseconds, loose).unwrap();
            assert_eq!(chunked, direct, "offset {}", offset);
        }
    }

    #[test]
    fn nanosecond_extreme_keeps_sub_microsecond_digits() {
        let ts = decode_timestamp_ns(i64::MAX, CalendarLimits::default()).unwrap();
        assert_eq!(ts.to_string(), "2262-04-11 23:47:16.854775807");
        assert_eq!(ts.time().unwrap().remainder_nanos(), 807);
    }

    #[test]
    fn nanosecond_timestamp_with_chunked_millis() {
        let tight = CalendarLimits::new(10, 999_999_999).unwrap();
        let ts = decode_timestamp_ns(1_700_000_000_123_456_789, tight).unwrap();
        assert_eq!(ts.to_string(), "2023-11-14 22:13:20.123456789");
    }

    #[test]
    fn negative_nanoseconds_floor() {
        let ts = decode_timestamp_ns(-1, CalendarLimits::default()).unwrap();
        assert_eq!(ts.to_string(), "1969-12-31 23:59:59.999999999");
    }

    #[test]
    fn timestamp_encode_round_trips() {
        for micros in [0i64, -1, 1_700_000_000_123_456, i64::MIN + 1, i64::MAX] {
            let ts = decode_timestamp(micros, false).unwrap();
            assert_eq!(encode_timestamp(&ts).unwrap(), micros);
        }
    }

    #[test]
    fn nanosecond_encode_round_trips() {
        let limits = CalendarLimits::default();
        for nanos in [0i64, -1, 1_700_000_000_123_456_789, i64::MAX] {
            let ts = decode_timestamp_ns(nanos, limits).unwrap();
            assert_eq!(encode_timestamp_ns(&ts).unwrap(), nanos);
        }
        assert!(encode_timestamp_ns(&Timestamp::PositiveInfinity).is_err());
    }

    #[test]
    fn time_tz_decodes_offset() {
        let time = decode_time_tz(pack_time_tz(3_600_000_000, -7200)).unwrap();
        assert_eq!(time.to_string(), "01:00:00-02:00");
        assert_eq!(encode_time_tz(&time), pack_time_tz(3_600_000_000, -7200));
    }

    #[test]
    fn dates_convert_through_day_numbers() {
        assert_eq!(decode_date(19_782).unwrap().to_string(), "2024-02-29");
        assert_eq!(decode_date(-163_882).unwrap().to_string(), "1521-04-23");
        assert_eq!(encode_date(&Date::new(2024, 2, 29).unwrap()), 19_782);
    }
}

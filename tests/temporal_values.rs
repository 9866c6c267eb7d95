//! # Temporal Decoding Test Suite
//!
//! DATE, TIME, TIME_TZ, INTERVAL and the timestamp family, including the
//! microsecond infinity sentinels and epoch offsets large enough to be applied
//! in steps.
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test temporal_values
//! ```

use quackcodec::engine::memory::{ColumnBuilder, MemoryResult};
use quackcodec::{
    codec_error, CalendarLimits, CodecConfig, CodecError, Date, Interval, LogicalType,
    MemoryEngine, NativeValue, Session, Time, Timestamp, Value,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn engine(ty: LogicalType, values: Vec<NativeValue>) -> MemoryEngine {
    let engine = MemoryEngine::new();
    engine.register_query("SELECT t FROM fixture", move || {
        let mut builder = ColumnBuilder::new(ty.clone());
        for value in &values {
            builder.push(value).map_err(|e| e.to_string())?;
        }
        Ok(MemoryResult::new([("t", ty.clone())], vec![vec![builder.finish()]]))
    });
    engine
}

fn rendered(session: &Session<MemoryEngine>) -> Vec<String> {
    let mut result = session.query("SELECT t FROM fixture").unwrap();
    result
        .rows()
        .map(|row| row.unwrap().get(0).unwrap().to_string())
        .collect()
}

fn small_steps() -> CodecConfig {
    CodecConfig::builder()
        .calendar_limits(CalendarLimits::new(10, 999_999_999).unwrap())
        .build()
}

// ============================================================================
// TIMESTAMP TESTS
// ============================================================================

mod timestamp_tests {
    use super::*;

    #[test]
    fn microsecond_sentinels_render_as_infinities() {
        for ty in [LogicalType::Timestamp, LogicalType::TimestampTz] {
            let session = Session::new(engine(
                ty,
                vec![
                    NativeValue::Timestamp(i64::MAX),
                    NativeValue::Timestamp(i64::MIN + 1),
                    NativeValue::Timestamp(0),
                ],
            ));
            let mut result = session.query("SELECT t FROM fixture").unwrap();
            let values: Vec<Value> = result
                .rows()
                .map(|row| row.unwrap().into_values().remove(0))
                .collect();
            assert_eq!(values[0], Value::Timestamp(Timestamp::PositiveInfinity));
            assert_eq!(values[1], Value::Timestamp(Timestamp::NegativeInfinity));
            assert_eq!(values[0].to_string(), "+infinity");
            assert_eq!(values[1].to_string(), "-infinity");
            assert!(values[2].to_string().starts_with("1970-01-01 00:00:00"));
        }
    }

    #[test]
    fn microsecond_timestamp_before_epoch() {
        let session = Session::new(engine(
            LogicalType::Timestamp,
            vec![NativeValue::Timestamp(-1)],
        ));
        assert_eq!(rendered(&session), vec!["1969-12-31 23:59:59.999999"]);
    }

    #[test]
    fn nanosecond_timestamp_at_the_top_of_the_range() {
        let values = vec![NativeValue::TimestampNs(i64::MAX), NativeValue::TimestampNs(1)];
        let expected = vec![
            "2262-04-11 23:47:16.854775807".to_string(),
            "1970-01-01 00:00:00.000000001".to_string(),
        ];

        let session = Session::new(engine(LogicalType::TimestampNs, values.clone()));
        assert_eq!(rendered(&session), expected);

        let session = Session::with_config(engine(LogicalType::TimestampNs, values), small_steps());
        assert_eq!(rendered(&session), expected);
    }

    #[test]
    fn large_millisecond_offsets_are_stepped() {
        let session = Session::new(engine(
            LogicalType::TimestampMs,
            vec![NativeValue::Timestamp(100_000_000_000_000_000)],
        ));
        assert_eq!(rendered(&session), vec!["5138-11-16 09:46:40"]);
    }

    #[test]
    fn second_precision_reaches_year_one() {
        let session = Session::with_config(
            engine(
                LogicalType::TimestampS,
                vec![NativeValue::Timestamp(-62_135_596_800_000_000)],
            ),
            small_steps(),
        );
        assert_eq!(rendered(&session), vec!["0001-01-01 00:00:00"]);
    }

    #[test]
    fn offsets_beyond_the_calendar_are_temporal_errors() {
        let session = Session::new(engine(
            LogicalType::TimestampS,
            vec![NativeValue::Timestamp(i64::MAX)],
        ));
        let mut result = session.query("SELECT t FROM fixture").unwrap();
        let report = result.rows().next().unwrap().unwrap_err();
        assert!(matches!(
            codec_error(&report),
            Some(CodecError::InvalidTemporalValue { .. })
        ));
    }

    #[test]
    fn nanoseconds_require_nanosecond_precision() {
        let datetime = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let report = Timestamp::from_datetime(
            datetime,
            quackcodec::TimePrecision::Microseconds,
            Some(5),
        )
        .unwrap_err();
        assert!(matches!(
            codec_error(&report),
            Some(CodecError::InvalidTemporalValue { .. })
        ));
    }
}

// ============================================================================
// DATE, TIME AND INTERVAL TESTS
// ============================================================================

mod calendar_tests {
    use super::*;

    #[test]
    fn dates_around_the_epoch() {
        let session = Session::new(engine(
            LogicalType::Date,
            vec![
                NativeValue::Date(0),
                NativeValue::Date(-1),
                NativeValue::Date(19_782),
                NativeValue::Null,
            ],
        ));
        assert_eq!(
            rendered(&session),
            vec!["1970-01-01", "1969-12-31", "2024-02-29", "NULL"]
        );
    }

    #[test]
    fn time_and_zoned_time() {
        let session = Session::new(engine(
            LogicalType::Time,
            vec![NativeValue::Time(45_296_789_000), NativeValue::Time(86_400_000_000)],
        ));
        assert_eq!(rendered(&session), vec!["12:34:56.789", "24:00:00"]);

        let zoned: Time = "12:30:00+05:30".parse().unwrap();
        let engine = MemoryEngine::new();
        engine
            .create_table("zones", [("t", LogicalType::TimeTz)])
            .unwrap();
        let session = Session::new(engine);
        {
            let mut appender = session.appender(None, "zones").unwrap();
            appender.append_row(&[Value::Time(zoned)]).unwrap();
            appender.flush().unwrap();
        }
        let mut result = session.query("SELECT * FROM zones").unwrap();
        let row = result.rows().next().unwrap().unwrap();
        assert_eq!(row.get(0), Some(&Value::Time(zoned)));
        assert_eq!(row.get(0).unwrap().to_string(), "12:30:00+05:30");
    }

    #[test]
    fn interval_components_are_independent() {
        let session = Session::new(engine(
            LogicalType::Interval,
            vec![NativeValue::Interval {
                months: -13,
                days: 40,
                micros: -1,
            }],
        ));
        let mut result = session.query("SELECT t FROM fixture").unwrap();
        let row = result.rows().next().unwrap().unwrap();
        assert_eq!(row.get(0), Some(&Value::Interval(Interval::new(-13, 40, -1))));
    }

    #[test]
    fn date_parsing_validates_the_calendar() {
        assert!("2023-02-29".parse::<Date>().is_err());
        assert_eq!("2024-02-29".parse::<Date>().unwrap().to_days(), 19_782);
    }
}

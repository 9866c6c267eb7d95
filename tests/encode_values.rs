//! # Value Encoding Test Suite
//!
//! Parameter binding and row appending: values are encoded, handed to the
//! engine, and read back through the decoder.
//!
//! ## Usage
//!
//! ```sh
//! cargo test --test encode_values
//! ```

use std::str::FromStr;

use quackcodec::{
    codec_error, Blob, CodecConfig, CodecError, Date, Decimal, Interval, LogicalType,
    MemoryEngine, Session, Timestamp, TypeId, Value, WideInteger,
};
use uuid::Uuid;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn typed_table() -> Session<MemoryEngine> {
    let engine = MemoryEngine::new();
    engine
        .create_table(
            "typed",
            [
                ("i", LogicalType::Integer),
                ("h", LogicalType::HugeInt),
                ("u", LogicalType::Uuid),
                ("d", LogicalType::Date),
                ("ts", LogicalType::Timestamp),
                ("iv", LogicalType::Interval),
                ("b", LogicalType::Blob),
                ("dec", LogicalType::Decimal { width: 10, scale: 2 }),
            ],
        )
        .unwrap();
    Session::new(engine)
}

fn error_kind(report: &eyre::Report) -> Option<&CodecError> {
    codec_error(report)
}

// ============================================================================
// APPENDER TESTS
// ============================================================================

mod appender_tests {
    use super::*;

    #[test]
    fn appended_values_decode_to_the_same_values() {
        let session = typed_table();
        let row = vec![
            Value::Integer(-42),
            Value::HugeInt(WideInteger::from_str("-170141183460469231731687303715884105728").unwrap()),
            Value::Uuid(Uuid::parse_str("ffffffff-0000-0000-0000-000000000001").unwrap()),
            Value::Date(Date::new(1999, 12, 31).unwrap()),
            Value::Timestamp(Timestamp::from_str("2024-01-02 03:04:05.123456").unwrap()),
            Value::Interval(Interval::new(1, 2, 3)),
            Value::Blob(Blob::new(vec![0xCA, 0xFE])),
            Value::Decimal(Decimal::new(12345, 10, 2).unwrap()),
        ];
        {
            let mut appender = session.appender(None, "typed").unwrap();
            appender.append_row(&row).unwrap();
            let nulls = vec![Value::Null; row.len()];
            appender.append_row(&nulls).unwrap();
            appender.flush().unwrap();
        }
        assert_eq!(session.engine().row_count("typed"), Some(2));

        let mut result = session.query("SELECT * FROM typed").unwrap();
        let rows: Vec<Vec<Value>> = result
            .rows()
            .map(|r| r.unwrap().into_values())
            .collect();
        assert_eq!(rows[0], row);
        assert!(rows[1].iter().all(Value::is_null));
        assert_eq!(rows[0][7].to_string(), "123.45");
    }

    #[test]
    fn explicit_targets_convert_text() {
        let session = typed_table();
        {
            let mut appender = session.appender(None, "typed").unwrap();
            appender.append(&Value::from("7"), Some(TypeId::Integer)).unwrap();
            appender
                .append(&Value::from("18446744073709551616"), Some(TypeId::HugeInt))
                .unwrap();
            appender
                .append(
                    &Value::from("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"),
                    Some(TypeId::Uuid),
                )
                .unwrap();
            appender.append(&Value::from("2000-02-29"), Some(TypeId::Date)).unwrap();
            appender.append(&Value::from("infinity"), Some(TypeId::Timestamp)).unwrap();
            appender.append(&Value::Null, None).unwrap();
            appender.append(&Value::from("\\x00\\x01"), Some(TypeId::Blob)).unwrap();
            appender.append(&Value::Double(0.5), Some(TypeId::Decimal)).unwrap();
            appender.end_row().unwrap();
        }

        let mut result = session.query("SELECT * FROM typed").unwrap();
        let row = result.rows().next().unwrap().unwrap();
        assert_eq!(row.get_i64(0).unwrap(), 7);
        assert_eq!(row.get(1).unwrap().to_string(), "18446744073709551616");
        assert_eq!(
            row.get(2).unwrap().to_string(),
            "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"
        );
        assert_eq!(row.get(3).unwrap().to_string(), "2000-02-29");
        assert_eq!(row.get(4).unwrap().to_string(), "+infinity");
        assert_eq!(row.get(7).unwrap().to_string(), "0.50");
    }

    #[test]
    fn engine_rejections_carry_the_engine_message() {
        let session = typed_table();
        let mut appender = session.appender(None, "typed").unwrap();

        let report = appender.append(&Value::from("text"), None).unwrap_err();
        match error_kind(&report) {
            Some(CodecError::Engine { operation, message }) => {
                assert_eq!(operation, "append");
                assert!(message.starts_with("Conversion Error"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        appender.append(&Value::Integer(1), None).unwrap();
        let report = appender.end_row().unwrap_err();
        assert!(matches!(
            error_kind(&report),
            Some(CodecError::Engine { operation, .. }) if operation == "end row"
        ));

        let report = session.appender(Some("other"), "typed").err().unwrap();
        assert!(report
            .to_string()
            .contains("Catalog Error: Table with name other.typed does not exist!"));
    }

    #[test]
    fn values_out_of_range_are_rejected_before_the_engine() {
        let session = typed_table();
        let mut appender = session.appender(None, "typed").unwrap();

        let report = appender
            .append(&Value::BigInt(i64::MAX), Some(TypeId::Integer))
            .unwrap_err();
        assert!(matches!(error_kind(&report), Some(CodecError::OutOfRange { .. })));

        let two_pow_130 =
            WideInteger::from_str("1361129467683753853853498429727072845824").unwrap();
        let report = appender
            .append(&Value::HugeInt(two_pow_130), Some(TypeId::HugeInt))
            .unwrap_err();
        assert!(matches!(error_kind(&report), Some(CodecError::OutOfRange { .. })));
        assert_eq!(appender.pending_columns(), 0);
    }

    #[test]
    fn wide_encoding_without_backend_is_typed() {
        let engine = MemoryEngine::new();
        engine
            .create_table("wide", [("h", LogicalType::HugeInt)])
            .unwrap();
        let config = CodecConfig::builder().without_numeric_backend().build();
        let session = Session::with_config(engine, config);
        let mut appender = session.appender(None, "wide").unwrap();

        appender
            .append_row(&[Value::HugeInt(WideInteger::Native(-5))])
            .unwrap();
        let report = appender
            .append(
                &Value::HugeInt(WideInteger::from_str("18446744073709551616").unwrap()),
                None,
            )
            .unwrap_err();
        assert!(matches!(
            error_kind(&report),
            Some(CodecError::BigNumbersUnavailable { .. })
        ));
    }

    #[test]
    fn nested_values_have_no_inferred_type() {
        let session = typed_table();
        let mut appender = session.appender(None, "typed").unwrap();
        let report = appender
            .append(&Value::List(vec![Value::Integer(1)]), None)
            .unwrap_err();
        assert!(matches!(
            error_kind(&report),
            Some(CodecError::UnsupportedType { .. })
        ));
    }
}

// ============================================================================
// PREPARED STATEMENT TESTS
// ============================================================================

mod bind_tests {
    use super::*;

    #[test]
    fn bound_parameters_round_trip() {
        let session = typed_table();
        let mut statement = session.prepare("SELECT ?, ?, ?, ?, ?").unwrap();
        assert_eq!(statement.parameter_count(), 5);

        let uuid = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        statement.bind(1, &Value::Uuid(uuid), None).unwrap();
        statement.bind(2, &Value::Interval(Interval::new(0, -1, 10)), None).unwrap();
        statement
            .bind(3, &Value::from("340282366920938463463374607431768211455"), Some(TypeId::UHugeInt))
            .unwrap();
        statement.bind(4, &Value::Integer(3), Some(TypeId::Double)).unwrap();
        statement.bind(5, &Value::Null, None).unwrap();

        let mut result = statement.execute().unwrap();
        assert_eq!(result.column_name(0), Some("$1"));
        let row = result.rows().next().unwrap().unwrap();
        assert_eq!(row.get(0), Some(&Value::Uuid(uuid)));
        assert_eq!(row.get(1), Some(&Value::Interval(Interval::new(0, -1, 10))));
        assert_eq!(
            row.get(2).unwrap().to_string(),
            "340282366920938463463374607431768211455"
        );
        assert_eq!(row.get_f64(3).unwrap(), 3.0);
        assert!(row.is_null(4));
    }

    #[test]
    fn rebinding_replaces_the_previous_value() {
        let session = typed_table();
        let mut statement = session.prepare("SELECT ?").unwrap();
        statement.bind_all(&[Value::from("first")]).unwrap();
        statement.bind(1, &Value::from("second"), None).unwrap();
        let mut result = statement.execute().unwrap();
        let row = result.rows().next().unwrap().unwrap();
        assert_eq!(row.get_str(0).unwrap(), "second");
    }

    #[test]
    fn unbound_parameter_fails_execution() {
        let session = typed_table();
        let mut statement = session.prepare("SELECT ?, ?").unwrap();
        statement.bind(1, &Value::Integer(1), None).unwrap();
        let report = statement.execute().err().unwrap();
        assert!(matches!(
            error_kind(&report),
            Some(CodecError::Engine { operation, .. }) if operation == "execute"
        ));
    }

    #[test]
    fn statement_without_parameters_runs_as_query() {
        let session = typed_table();
        let mut statement = session.prepare("SELECT * FROM typed").unwrap();
        assert_eq!(statement.parameter_count(), 0);
        let mut result = statement.execute().unwrap();
        assert_eq!(result.column_count(), 8);
        assert!(result.rows().next().is_none());

        let report = session.prepare("DELETE FROM typed").err().unwrap();
        assert!(matches!(
            error_kind(&report),
            Some(CodecError::Engine { operation, .. }) if operation == "prepare"
        ));
    }
}

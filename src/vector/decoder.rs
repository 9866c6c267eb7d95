//! Per-column decoder, resolved once from a native vector's type tree.

use std::ops::Range;

use eyre::Result;

use super::nested;
use crate::abi::{HugeIntSlot, IntervalSlot, UHugeIntSlot};
use crate::codec::scalar::{
    read_bool, read_f32, read_f64, read_i16, read_i32, read_i64, read_i8, read_u16, read_u32,
    read_u64, read_u8,
};
use crate::codec::temporal::{
    decode_date, decode_time, decode_time_tz, decode_timestamp, decode_timestamp_ms,
    decode_timestamp_ns, decode_timestamp_s,
};
use crate::codec::wide::{
    decode_bit, decode_hugeint, decode_uhugeint, decode_uuid, decode_varint, hugeint_to_i128,
};
use crate::codec::{decode_varchar, is_valid, read_varlen};
use crate::config::{CodecConfig, MAX_NESTING_DEPTH};
use crate::engine::NativeVector;
use crate::error::CodecError;
use crate::types::{Blob, Decimal, Interval, LogicalType, TypeId, Value};

/// Decoding routine for one vector, with the routines of its children.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDecoder {
    SqlNull,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    UTinyInt,
    USmallInt,
    UInteger,
    UBigInt,
    Float,
    Double,
    HugeInt,
    UHugeInt,
    Uuid,
    Decimal { width: u8, scale: u8, storage: TypeId },
    Enum { dictionary: Vec<String>, storage: TypeId },
    Varchar,
    Blob,
    Bit,
    Varint,
    Date,
    Time,
    TimeTz,
    Timestamp,
    TimestampTz,
    TimestampS,
    TimestampMs,
    TimestampNs,
    Interval,
    List(Box<ColumnDecoder>),
    /// Child decoder is the `STRUCT(key, value)` entry decoder.
    Map(Box<ColumnDecoder>),
    Array { child: Box<ColumnDecoder>, size: usize },
    Struct(Vec<(String, ColumnDecoder)>),
    /// Member decoders, without the tag.
    Union(Vec<ColumnDecoder>),
}

impl ColumnDecoder {
    pub fn resolve(vector: &dyn NativeVector) -> Result<Self> {
        vector.logical_type().validate_depth()?;
        Self::resolve_at(vector, 1)
    }

    fn resolve_at(vector: &dyn NativeVector, depth: usize) -> Result<Self> {
        if depth > MAX_NESTING_DEPTH {
            return Err(CodecError::malformed(format!(
                "vector nesting exceeds {} levels",
                MAX_NESTING_DEPTH
            ))
            .into());
        }
        let logical = vector.logical_type();
        let expected = logical.storage_type();
        if vector.storage_type() != expected {
            return Err(CodecError::malformed(format!(
                "{} vector reports {} storage, expected {}",
                logical,
                vector.storage_type(),
                expected
            ))
            .into());
        }

        let child = |index: usize| -> Result<Self> {
            let native = vector.child(index).ok_or_else(|| {
                CodecError::malformed(format!("{} vector has no child {}", logical, index))
            })?;
            Self::resolve_at(native, depth + 1)
        };

        let decoder = match logical {
            LogicalType::SqlNull => ColumnDecoder::SqlNull,
            LogicalType::Boolean => ColumnDecoder::Boolean,
            LogicalType::TinyInt => ColumnDecoder::TinyInt,
            LogicalType::SmallInt => ColumnDecoder::SmallInt,
            LogicalType::Integer => ColumnDecoder::Integer,
            LogicalType::BigInt => ColumnDecoder::BigInt,
            LogicalType::UTinyInt => ColumnDecoder::UTinyInt,
            LogicalType::USmallInt => ColumnDecoder::USmallInt,
            LogicalType::UInteger => ColumnDecoder::UInteger,
            LogicalType::UBigInt => ColumnDecoder::UBigInt,
            LogicalType::Float => ColumnDecoder::Float,
            LogicalType::Double => ColumnDecoder::Double,
            LogicalType::HugeInt => ColumnDecoder::HugeInt,
            LogicalType::UHugeInt => ColumnDecoder::UHugeInt,
            LogicalType::Uuid => ColumnDecoder::Uuid,
            LogicalType::Decimal { width, scale } => ColumnDecoder::Decimal {
                width: *width,
                scale: *scale,
                storage: expected,
            },
            LogicalType::Enum { dictionary } => ColumnDecoder::Enum {
                dictionary: dictionary.clone(),
                storage: expected,
            },
            LogicalType::Varchar => ColumnDecoder::Varchar,
            LogicalType::Blob => ColumnDecoder::Blob,
            LogicalType::Bit => ColumnDecoder::Bit,
            LogicalType::Varint => ColumnDecoder::Varint,
            LogicalType::Date => ColumnDecoder::Date,
            LogicalType::Time => ColumnDecoder::Time,
            LogicalType::TimeTz => ColumnDecoder::TimeTz,
            LogicalType::Timestamp => ColumnDecoder::Timestamp,
            LogicalType::TimestampTz => ColumnDecoder::TimestampTz,
            LogicalType::TimestampS => ColumnDecoder::TimestampS,
            LogicalType::TimestampMs => ColumnDecoder::TimestampMs,
            LogicalType::TimestampNs => ColumnDecoder::TimestampNs,
            LogicalType::Interval => ColumnDecoder::Interval,
            LogicalType::List(_) => ColumnDecoder::List(Box::new(child(0)?)),
            LogicalType::Map { .. } => {
                let entry = child(0)?;
                if !matches!(&entry, ColumnDecoder::Struct(fields) if fields.len() == 2) {
                    return Err(CodecError::malformed(format!(
                        "{} vector child is not a key/value struct",
                        logical
                    ))
                    .into());
                }
                ColumnDecoder::Map(Box::new(entry))
            }
            LogicalType::Array { size, .. } => ColumnDecoder::Array {
                child: Box::new(child(0)?),
                size: *size,
            },
            LogicalType::Struct(fields) => ColumnDecoder::Struct(
                fields
                    .iter()
                    .enumerate()
                    .map(|(i, (name, _))| Ok((name.clone(), child(i)?)))
                    .collect::<Result<_>>()?,
            ),
            LogicalType::Union(members) => {
                if child(0)? != ColumnDecoder::UTinyInt {
                    return Err(CodecError::malformed(format!(
                        "{} vector tag is not UTINYINT",
                        logical
                    ))
                    .into());
                }
                ColumnDecoder::Union(
                    (1..=members.len())
                        .map(&child)
                        .collect::<Result<_>>()?,
                )
            }
        };
        Ok(decoder)
    }

    /// Decodes `row`, consulting the validity bitmap before the slot.
    pub fn decode(
        &self,
        vector: &dyn NativeVector,
        row: usize,
        config: &CodecConfig,
    ) -> Result<Value> {
        if !is_valid(vector.validity(), row) {
            return Ok(Value::Null);
        }
        let data = vector.data();
        let value = match self {
            ColumnDecoder::SqlNull => Value::Null,
            ColumnDecoder::Boolean => Value::Boolean(read_bool(data, row)?),
            ColumnDecoder::TinyInt => Value::TinyInt(read_i8(data, row)?),
            ColumnDecoder::SmallInt => Value::SmallInt(read_i16(data, row)?),
            ColumnDecoder::Integer => Value::Integer(read_i32(data, row)?),
            ColumnDecoder::BigInt => Value::BigInt(read_i64(data, row)?),
            ColumnDecoder::UTinyInt => Value::UTinyInt(read_u8(data, row)?),
            ColumnDecoder::USmallInt => Value::USmallInt(read_u16(data, row)?),
            ColumnDecoder::UInteger => Value::UInteger(read_u32(data, row)?),
            ColumnDecoder::UBigInt => Value::UBigInt(read_u64(data, row)?),
            ColumnDecoder::Float => Value::Float(read_f32(data, row)?),
            ColumnDecoder::Double => Value::Double(read_f64(data, row)?),
            ColumnDecoder::HugeInt => {
                let slot = HugeIntSlot::at(data, row)?;
                Value::HugeInt(decode_hugeint(
                    slot.lower(),
                    slot.upper(),
                    config.numeric_backend(),
                )?)
            }
            ColumnDecoder::UHugeInt => {
                let slot = UHugeIntSlot::at(data, row)?;
                Value::UHugeInt(decode_uhugeint(
                    slot.lower(),
                    slot.upper(),
                    config.numeric_backend(),
                )?)
            }
            ColumnDecoder::Uuid => {
                let slot = HugeIntSlot::at(data, row)?;
                Value::Uuid(decode_uuid(slot.lower(), slot.upper()))
            }
            ColumnDecoder::Decimal {
                width,
                scale,
                storage,
            } => {
                let scaled = match storage {
                    TypeId::SmallInt => read_i16(data, row)? as i128,
                    TypeId::Integer => read_i32(data, row)? as i128,
                    TypeId::BigInt => read_i64(data, row)? as i128,
                    _ => {
                        let slot = HugeIntSlot::at(data, row)?;
                        hugeint_to_i128(slot.lower(), slot.upper())
                    }
                };
                Value::Decimal(Decimal::new(scaled, *width, *scale)?)
            }
            ColumnDecoder::Enum {
                dictionary,
                storage,
            } => {
                let index = match storage {
                    TypeId::UTinyInt => read_u8(data, row)? as usize,
                    TypeId::USmallInt => read_u16(data, row)? as usize,
                    _ => read_u32(data, row)? as usize,
                };
                let label = dictionary.get(index).ok_or_else(|| {
                    CodecError::malformed(format!(
                        "ENUM index {} outside a dictionary of {}",
                        index,
                        dictionary.len()
                    ))
                })?;
                Value::Enum(label.clone())
            }
            ColumnDecoder::Varchar => Value::Varchar(decode_varchar(vector, row)?),
            ColumnDecoder::Blob => Value::Blob(Blob::new(read_varlen(vector, row)?)),
            ColumnDecoder::Bit => Value::Bit(decode_bit(read_varlen(vector, row)?)?),
            ColumnDecoder::Varint => Value::Varint(decode_varint(
                read_varlen(vector, row)?,
                config.numeric_backend(),
            )?),
            ColumnDecoder::Date => Value::Date(decode_date(read_i32(data, row)?)?),
            ColumnDecoder::Time => Value::Time(decode_time(read_i64(data, row)?)?),
            ColumnDecoder::TimeTz => Value::Time(decode_time_tz(read_u64(data, row)?)?),
            ColumnDecoder::Timestamp => {
                Value::Timestamp(decode_timestamp(read_i64(data, row)?, false)?)
            }
            ColumnDecoder::TimestampTz => {
                Value::Timestamp(decode_timestamp(read_i64(data, row)?, true)?)
            }
            ColumnDecoder::TimestampS => Value::Timestamp(decode_timestamp_s(
                read_i64(data, row)?,
                config.calendar_limits(),
            )?),
            ColumnDecoder::TimestampMs => Value::Timestamp(decode_timestamp_ms(
                read_i64(data, row)?,
                config.calendar_limits(),
            )?),
            ColumnDecoder::TimestampNs => Value::Timestamp(decode_timestamp_ns(
                read_i64(data, row)?,
                config.calendar_limits(),
            )?),
            ColumnDecoder::Interval => {
                let slot = IntervalSlot::at(data, row)?;
                Value::Interval(Interval::new(slot.months(), slot.days(), slot.micros()))
            }
            ColumnDecoder::List(child) => nested::decode_list(child, vector, row, config)?,
            ColumnDecoder::Map(entry) => nested::decode_map(entry, vector, row, config)?,
            ColumnDecoder::Array { child, size } => {
                nested::decode_array(child, *size, vector, row, config)?
            }
            ColumnDecoder::Struct(fields) => nested::decode_struct(fields, vector, row, config)?,
            ColumnDecoder::Union(members) => nested::decode_union(members, vector, row, config)?,
        };
        Ok(value)
    }

    /// Decodes a contiguous range of rows. Nested children are decoded once
    /// for the whole range and sliced per row.
    pub fn decode_rows(
        &self,
        vector: &dyn NativeVector,
        rows: Range<usize>,
        config: &CodecConfig,
    ) -> Result<Vec<Value>> {
        match self {
            ColumnDecoder::List(child) => nested::decode_list_rows(child, vector, rows, config),
            ColumnDecoder::Map(entry) => nested::decode_map_rows(entry, vector, rows, config),
            ColumnDecoder::Array { child, size } => {
                nested::decode_array_rows(child, *size, vector, rows, config)
            }
            ColumnDecoder::Struct(fields) => {
                nested::decode_struct_rows(fields, vector, rows, config)
            }
            _ => rows.map(|row| self.decode(vector, row, config)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::ColumnBuilder;
    use crate::engine::NativeValue;

    fn decode_all(ty: LogicalType, values: &[NativeValue]) -> Vec<Value> {
        let mut builder = ColumnBuilder::new(ty);
        for v in values {
            builder.push(v).unwrap();
        }
        let buffer = builder.finish();
        let decoder = ColumnDecoder::resolve(&buffer).unwrap();
        decoder
            .decode_rows(&buffer, 0..values.len(), &CodecConfig::default())
            .unwrap()
    }

    #[test]
    fn resolves_nested_decoders_once() {
        let ty = LogicalType::map(LogicalType::Varchar, LogicalType::list(LogicalType::Integer));
        let buffer = ColumnBuilder::new(ty).finish();
        let decoder = ColumnDecoder::resolve(&buffer).unwrap();
        let ColumnDecoder::Map(entry) = decoder else {
            panic!("expected map decoder");
        };
        let ColumnDecoder::Struct(fields) = *entry else {
            panic!("expected entry struct");
        };
        assert_eq!(fields[0], ("key".to_string(), ColumnDecoder::Varchar));
        assert_eq!(
            fields[1],
            (
                "value".to_string(),
                ColumnDecoder::List(Box::new(ColumnDecoder::Integer))
            )
        );
    }

    #[test]
    fn decodes_integers_and_nulls() {
        let values = decode_all(
            LogicalType::SmallInt,
            &[
                NativeValue::SmallInt(-3),
                NativeValue::Null,
                NativeValue::SmallInt(i16::MAX),
            ],
        );
        assert_eq!(
            values,
            vec![Value::SmallInt(-3), Value::Null, Value::SmallInt(i16::MAX)]
        );
    }

    #[test]
    fn decimal_reads_storage_width() {
        for width in [4u8, 9, 18, 38] {
            let ty = LogicalType::Decimal { width, scale: 2 };
            let mut builder = ColumnBuilder::new(ty);
            builder.push_decimal(-1234).unwrap();
            let buffer = builder.finish();
            let decoder = ColumnDecoder::resolve(&buffer).unwrap();
            let value = decoder.decode(&buffer, 0, &CodecConfig::default()).unwrap();
            assert_eq!(value, Value::Decimal(Decimal::new(-1234, width, 2).unwrap()));
            assert_eq!(value.to_string(), "-12.34");
        }
    }

    #[test]
    fn enum_maps_index_to_label() {
        let ty = LogicalType::enumeration(["red", "green", "blue"]);
        let values = decode_all(
            ty,
            &[
                NativeValue::Varchar("blue".into()),
                NativeValue::UTinyInt(0),
            ],
        );
        assert_eq!(values, vec![Value::Enum("blue".into()), Value::Enum("red".into())]);
    }

    #[test]
    fn enum_index_outside_dictionary_is_malformed() {
        let ty = LogicalType::enumeration(["only"]);
        let mut builder = ColumnBuilder::new(ty);
        builder.push_enum_index(5).unwrap();
        let buffer = builder.finish();
        let decoder = ColumnDecoder::resolve(&buffer).unwrap();
        let err = decoder.decode(&buffer, 0, &CodecConfig::default()).unwrap_err();
        assert!(matches!(
            crate::error::codec_error(&err),
            Some(CodecError::MalformedNativeValue { .. })
        ));
    }

    #[test]
    fn interval_and_uuid_slots() {
        let values = decode_all(
            LogicalType::Interval,
            &[NativeValue::Interval {
                months: 14,
                days: -3,
                micros: 1_500_000,
            }],
        );
        assert_eq!(values, vec![Value::Interval(Interval::new(14, -3, 1_500_000))]);

        let values = decode_all(
            LogicalType::Uuid,
            &[NativeValue::Uuid {
                lower: 1,
                upper: 0,
            }],
        );
        assert_eq!(
            values[0].to_string(),
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn timestamp_precisions_decode_to_same_instant() {
        let one_second = [
            (LogicalType::Timestamp, NativeValue::Timestamp(1_000_000)),
            (LogicalType::TimestampS, NativeValue::Timestamp(1_000_000)),
            (LogicalType::TimestampMs, NativeValue::Timestamp(1_000_000)),
            (LogicalType::TimestampNs, NativeValue::TimestampNs(1_000_000_000)),
        ];
        for (ty, value) in one_second {
            let values = decode_all(ty, &[value]);
            assert_eq!(values[0].to_string(), "1970-01-01 00:00:01");
        }
    }
}

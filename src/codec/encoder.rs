//! # Value Encoder
//!
//! Converts a [`Value`] into the [`NativeValue`] the engine's value
//! constructors take, for parameter binding and appending.
//!
//! ## Target Resolution
//!
//! ```text
//! encode(value, Some(target)) ──────────────────────────┐
//!                                                       ├──> convert ──> NativeValue
//! encode(value, None) ──> infer_type(value) ──> target ─┘
//! ```
//!
//! A NULL value always encodes to `NativeValue::Null`, whatever the target.
//!
//! ## Inference
//!
//! | Value                    | Inferred target |
//! |--------------------------|-----------------|
//! | Boolean                  | BOOLEAN         |
//! | TinyInt..UBigInt         | same width      |
//! | Float / Double           | FLOAT / DOUBLE  |
//! | Varchar                  | VARCHAR         |
//! | Date / Interval / Uuid / Blob | same type  |
//! | Time                     | TIME, or TIME_TZ when it carries an offset |
//! | Timestamp                | TIMESTAMP       |
//! | HugeInt / UHugeInt       | same type       |
//! | Decimal                  | DECIMAL         |
//! | Null                     | SQLNULL         |
//!
//! ENUM, BIT, VARINT and the nested values have no constructor on the encode
//! path and fail with `UnsupportedType`.
//!
//! ## Conversions
//!
//! - Integer targets accept any integer value that fits, and strings that
//!   parse as one. Values that do not fit fail with `OutOfRange`.
//! - DECIMAL targets are handed to the engine as DOUBLE.
//! - TIMESTAMP, TIMESTAMP_S, TIMESTAMP_MS and TIMESTAMP_TZ are encoded as
//!   microseconds; the engine casts to the column's precision.
//! - VARCHAR accepts the display form of any scalar value.
//! - Temporal and UUID targets parse strings in their display form.

use std::sync::Arc;

use eyre::Result;
use uuid::Uuid;

use crate::codec::temporal::{encode_time_tz, encode_timestamp, encode_timestamp_ns};
use crate::codec::wide::{encode_hugeint, encode_uhugeint, encode_uuid, uuid_from_integer};
use crate::config::CodecConfig;
use crate::engine::NativeValue;
use crate::error::CodecError;
use crate::types::{Date, Interval, Time, Timestamp, TypeId, Value, WideInteger};

/// Picks the target type for a value encoded without an explicit one.
pub fn infer_type(value: &Value) -> Option<TypeId> {
    Some(match value {
        Value::Null => TypeId::SqlNull,
        Value::Boolean(_) => TypeId::Boolean,
        Value::TinyInt(_) => TypeId::TinyInt,
        Value::SmallInt(_) => TypeId::SmallInt,
        Value::Integer(_) => TypeId::Integer,
        Value::BigInt(_) => TypeId::BigInt,
        Value::UTinyInt(_) => TypeId::UTinyInt,
        Value::USmallInt(_) => TypeId::USmallInt,
        Value::UInteger(_) => TypeId::UInteger,
        Value::UBigInt(_) => TypeId::UBigInt,
        Value::Float(_) => TypeId::Float,
        Value::Double(_) => TypeId::Double,
        Value::HugeInt(_) => TypeId::HugeInt,
        Value::UHugeInt(_) => TypeId::UHugeInt,
        Value::Decimal(_) => TypeId::Decimal,
        Value::Varchar(_) => TypeId::Varchar,
        Value::Blob(_) => TypeId::Blob,
        Value::Date(_) => TypeId::Date,
        Value::Time(t) if t.is_timezoned() => TypeId::TimeTz,
        Value::Time(_) => TypeId::Time,
        Value::Timestamp(_) => TypeId::Timestamp,
        Value::Interval(_) => TypeId::Interval,
        Value::Uuid(_) => TypeId::Uuid,
        Value::Enum(_)
        | Value::Bit(_)
        | Value::Varint(_)
        | Value::List(_)
        | Value::Array(_)
        | Value::Struct(_)
        | Value::Map(_) => return None,
    })
}

#[derive(Debug, Clone, Default)]
pub struct ValueEncoder {
    config: Arc<CodecConfig>,
}

impl ValueEncoder {
    pub fn new(config: Arc<CodecConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn encode(&self, value: &Value, target: Option<TypeId>) -> Result<NativeValue> {
        let target = match target {
            Some(target) => target,
            None => infer_type(value).ok_or_else(|| CodecError::unsupported(value.kind()))?,
        };
        if value.is_null() {
            return Ok(NativeValue::Null);
        }

        let native = match target {
            TypeId::Boolean => NativeValue::Boolean(self.boolean(value, target)?),
            TypeId::TinyInt => NativeValue::TinyInt(narrow(self.integer(value, target)?, target)?),
            TypeId::SmallInt => NativeValue::SmallInt(narrow(self.integer(value, target)?, target)?),
            TypeId::Integer => NativeValue::Integer(narrow(self.integer(value, target)?, target)?),
            TypeId::BigInt => NativeValue::BigInt(narrow(self.integer(value, target)?, target)?),
            TypeId::UTinyInt => NativeValue::UTinyInt(narrow(self.integer(value, target)?, target)?),
            TypeId::USmallInt => {
                NativeValue::USmallInt(narrow(self.integer(value, target)?, target)?)
            }
            TypeId::UInteger => NativeValue::UInteger(narrow(self.integer(value, target)?, target)?),
            TypeId::UBigInt => NativeValue::UBigInt(narrow(self.integer(value, target)?, target)?),
            TypeId::Float => NativeValue::Float(self.float(value, target)? as f32),
            TypeId::Double | TypeId::Decimal => NativeValue::Double(self.float(value, target)?),
            TypeId::Varchar => NativeValue::Varchar(self.text(value, target)?),
            TypeId::Blob => NativeValue::Blob(self.bytes(value, target)?),
            TypeId::Date => NativeValue::Date(self.date(value, target)?.to_days()),
            TypeId::Time => NativeValue::Time(self.time(value, target)?.to_micros()),
            TypeId::TimeTz => NativeValue::TimeTz(encode_time_tz(&self.time(value, target)?)),
            TypeId::Timestamp | TypeId::TimestampS | TypeId::TimestampMs => {
                NativeValue::Timestamp(encode_timestamp(&self.timestamp(value, target)?)?)
            }
            TypeId::TimestampTz => {
                NativeValue::TimestampTz(encode_timestamp(&self.timestamp(value, target)?)?)
            }
            TypeId::TimestampNs => {
                NativeValue::TimestampNs(encode_timestamp_ns(&self.timestamp(value, target)?)?)
            }
            TypeId::Interval => {
                let Interval {
                    months,
                    days,
                    micros,
                } = self.interval(value, target)?;
                NativeValue::Interval {
                    months,
                    days,
                    micros,
                }
            }
            TypeId::HugeInt => {
                let wide = self.wide(value, target)?;
                let (lower, upper) = encode_hugeint(&wide, self.config.numeric_backend())?;
                NativeValue::HugeInt { lower, upper }
            }
            TypeId::UHugeInt => {
                let wide = self.wide(value, target)?;
                let (lower, upper) = encode_uhugeint(&wide, self.config.numeric_backend())?;
                NativeValue::UHugeInt { lower, upper }
            }
            TypeId::Uuid => {
                let (lower, upper) = encode_uuid(&self.uuid(value, target)?);
                NativeValue::Uuid { lower, upper }
            }
            TypeId::SqlNull => return Err(mismatch(value, target)),
            other => return Err(CodecError::unsupported(other.name()).into()),
        };
        Ok(native)
    }

    fn boolean(&self, value: &Value, target: TypeId) -> Result<bool> {
        match value {
            Value::Boolean(b) => Ok(*b),
            Value::Varchar(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(true),
                "false" | "f" | "0" => Ok(false),
                _ => Err(mismatch(value, target)),
            },
            _ => Err(mismatch(value, target)),
        }
    }

    fn integer(&self, value: &Value, target: TypeId) -> Result<i128> {
        let out_of_range = || CodecError::out_of_range(target.name(), value);
        match value {
            Value::UBigInt(v) => Ok(*v as i128),
            Value::HugeInt(w) | Value::UHugeInt(w) | Value::Varint(w) => {
                Ok(w.to_i128().ok_or_else(out_of_range)?)
            }
            Value::Varchar(s) => {
                let wide: WideInteger = s.trim().parse().map_err(|_| mismatch(value, target))?;
                Ok(wide.to_i128().ok_or_else(out_of_range)?)
            }
            other => other
                .as_i64()
                .map(i128::from)
                .ok_or_else(|| mismatch(value, target)),
        }
    }

    fn float(&self, value: &Value, target: TypeId) -> Result<f64> {
        if let Some(f) = value.as_f64() {
            return Ok(f);
        }
        if let Some(i) = value.as_i64() {
            return Ok(i as f64);
        }
        match value {
            Value::UBigInt(v) => Ok(*v as f64),
            Value::Varchar(s) => s.trim().parse().map_err(|_| mismatch(value, target)),
            _ => Err(mismatch(value, target)),
        }
    }

    fn text(&self, value: &Value, target: TypeId) -> Result<String> {
        match value {
            Value::Varchar(s) | Value::Enum(s) | Value::Bit(s) => Ok(s.clone()),
            Value::List(_) | Value::Array(_) | Value::Struct(_) | Value::Map(_) => {
                Err(mismatch(value, target))
            }
            scalar => Ok(scalar.to_string()),
        }
    }

    fn bytes(&self, value: &Value, target: TypeId) -> Result<Vec<u8>> {
        match value {
            Value::Blob(b) => Ok(b.as_bytes().to_vec()),
            Value::Varchar(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(mismatch(value, target)),
        }
    }

    fn date(&self, value: &Value, target: TypeId) -> Result<Date> {
        match value {
            Value::Date(d) => Ok(*d),
            Value::Timestamp(Timestamp::Finite { date, .. }) => Ok(*date),
            Value::Varchar(s) => s.trim().parse(),
            _ => Err(mismatch(value, target)),
        }
    }

    fn time(&self, value: &Value, target: TypeId) -> Result<Time> {
        match value {
            Value::Time(t) => Ok(*t),
            Value::Timestamp(Timestamp::Finite { time, .. }) => Ok(*time),
            Value::Varchar(s) => s.trim().parse(),
            _ => Err(mismatch(value, target)),
        }
    }

    fn timestamp(&self, value: &Value, target: TypeId) -> Result<Timestamp> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            Value::Date(d) => Ok(Timestamp::new(*d, Time::new(0, 0, 0)?)),
            Value::Varchar(s) => s.trim().parse(),
            _ => Err(mismatch(value, target)),
        }
    }

    fn interval(&self, value: &Value, target: TypeId) -> Result<Interval> {
        match value {
            Value::Interval(i) => Ok(*i),
            _ => Err(mismatch(value, target)),
        }
    }

    fn wide(&self, value: &Value, target: TypeId) -> Result<WideInteger> {
        match value {
            Value::HugeInt(w) | Value::UHugeInt(w) | Value::Varint(w) => Ok(w.clone()),
            Value::UBigInt(v) => Ok(WideInteger::from(*v as i128)),
            Value::Varchar(s) => s.trim().parse().map_err(|_| mismatch(value, target)),
            other => other
                .as_i64()
                .map(WideInteger::Native)
                .ok_or_else(|| mismatch(value, target)),
        }
    }

    fn uuid(&self, value: &Value, target: TypeId) -> Result<Uuid> {
        match value {
            Value::Uuid(u) => Ok(*u),
            Value::Varchar(s) => Uuid::parse_str(s.trim()).map_err(|_| mismatch(value, target)),
            Value::UHugeInt(w) | Value::HugeInt(w) => {
                uuid_from_integer(w, self.config.numeric_backend())
            }
            _ => Err(mismatch(value, target)),
        }
    }
}

fn narrow<T: TryFrom<i128>>(value: i128, target: TypeId) -> Result<T> {
    T::try_from(value).map_err(|_| CodecError::out_of_range(target.name(), value).into())
}

fn mismatch(value: &Value, target: TypeId) -> eyre::Report {
    CodecError::unsupported(format!("{} as {}", value.kind(), target.name())).into()
}

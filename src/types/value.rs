//! # Decoded Values
//!
//! `Value` is the owned, language-level representation of one cell. The
//! vector decoder produces it and the value encoder consumes it.
//!
//! ## Value Variants
//!
//! | Variant | Rust Type | Produced from |
//! |---------|-----------|---------------|
//! | Null | - | invalid validity bit, SQLNULL |
//! | Boolean | bool | BOOLEAN |
//! | TinyInt..BigInt | i8, i16, i32, i64 | signed integers |
//! | UTinyInt..UBigInt | u8, u16, u32, u64 | unsigned integers |
//! | Float, Double | f32, f64 | FLOAT, DOUBLE |
//! | HugeInt, UHugeInt | WideInteger | HUGEINT, UHUGEINT |
//! | Varint | WideInteger | VARINT |
//! | Decimal | Decimal | DECIMAL(w,s) |
//! | Varchar | String | VARCHAR |
//! | Blob | Blob | BLOB |
//! | Enum | String | ENUM dictionary entry |
//! | Bit | String | BIT as '0'/'1' characters |
//! | Date, Time, Timestamp, Interval | temporal types | DATE, TIME[_TZ], TIMESTAMP*, INTERVAL |
//! | Uuid | uuid::Uuid | UUID |
//! | List, Array | Vec<Value> | LIST, ARRAY |
//! | Struct | Vec<(String, Value)> | STRUCT |
//! | Map | Vec<(Value, Value)> | MAP, key order preserved |
//!
//! UNION decodes to the value of its active member, so it has no variant of
//! its own.

use std::fmt;

use uuid::Uuid;

use super::{Blob, Date, Decimal, Interval, Time, Timestamp, WideInteger};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    UTinyInt(u8),
    USmallInt(u16),
    UInteger(u32),
    UBigInt(u64),
    Float(f32),
    Double(f64),
    HugeInt(WideInteger),
    UHugeInt(WideInteger),
    Varint(WideInteger),
    Decimal(Decimal),
    Varchar(String),
    Blob(Blob),
    Enum(String),
    Bit(String),
    Date(Date),
    Time(Time),
    Timestamp(Timestamp),
    Interval(Interval),
    Uuid(Uuid),
    List(Vec<Value>),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(_) => "BOOLEAN",
            Value::TinyInt(_) => "TINYINT",
            Value::SmallInt(_) => "SMALLINT",
            Value::Integer(_) => "INTEGER",
            Value::BigInt(_) => "BIGINT",
            Value::UTinyInt(_) => "UTINYINT",
            Value::USmallInt(_) => "USMALLINT",
            Value::UInteger(_) => "UINTEGER",
            Value::UBigInt(_) => "UBIGINT",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::HugeInt(_) => "HUGEINT",
            Value::UHugeInt(_) => "UHUGEINT",
            Value::Varint(_) => "VARINT",
            Value::Decimal(_) => "DECIMAL",
            Value::Varchar(_) => "VARCHAR",
            Value::Blob(_) => "BLOB",
            Value::Enum(_) => "ENUM",
            Value::Bit(_) => "BIT",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::Timestamp(_) => "TIMESTAMP",
            Value::Interval(_) => "INTERVAL",
            Value::Uuid(_) => "UUID",
            Value::List(_) => "LIST",
            Value::Array(_) => "ARRAY",
            Value::Struct(_) => "STRUCT",
            Value::Map(_) => "MAP",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Any integer variant that fits `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(*v as i64),
            Value::SmallInt(v) => Some(*v as i64),
            Value::Integer(v) => Some(*v as i64),
            Value::BigInt(v) => Some(*v),
            Value::UTinyInt(v) => Some(*v as i64),
            Value::USmallInt(v) => Some(*v as i64),
            Value::UInteger(v) => Some(*v as i64),
            Value::UBigInt(v) => i64::try_from(*v).ok(),
            Value::HugeInt(w) | Value::UHugeInt(w) | Value::Varint(w) => w.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    /// Text of VARCHAR, ENUM and BIT values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(s) | Value::Enum(s) | Value::Bit(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Map entry by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Boolean,
    i8 => TinyInt,
    i16 => SmallInt,
    i32 => Integer,
    i64 => BigInt,
    u8 => UTinyInt,
    u16 => USmallInt,
    u32 => UInteger,
    u64 => UBigInt,
    f32 => Float,
    f64 => Double,
    String => Varchar,
    Decimal => Decimal,
    Blob => Blob,
    Date => Date,
    Time => Time,
    Timestamp => Timestamp,
    Interval => Interval,
    Uuid => Uuid,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Varchar(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T>(
            f: &mut fmt::Formatter<'_>,
            items: &[T],
            mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
        ) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                each(f, item)?;
            }
            Ok(())
        }

        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::UTinyInt(v) => write!(f, "{}", v),
            Value::USmallInt(v) => write!(f, "{}", v),
            Value::UInteger(v) => write!(f, "{}", v),
            Value::UBigInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::HugeInt(v) | Value::UHugeInt(v) | Value::Varint(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Varchar(v) | Value::Enum(v) | Value::Bit(v) => f.write_str(v),
            Value::Blob(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::Timestamp(v) => write!(f, "{}", v),
            Value::Interval(v) => write!(f, "{}", v),
            Value::Uuid(v) => write!(f, "{}", v.hyphenated()),
            Value::List(items) | Value::Array(items) => {
                f.write_str("[")?;
                join(f, items, |f, v| write!(f, "{}", v))?;
                f.write_str("]")
            }
            Value::Struct(fields) => {
                f.write_str("{")?;
                join(f, fields, |f, (n, v)| write!(f, "'{}': {}", n, v))?;
                f.write_str("}")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                join(f, entries, |f, (k, v)| write!(f, "{}={}", k, v))?;
                f.write_str("}")
            }
        }
    }
}

//! # Logical Types
//!
//! This module provides the engine's type tags (`TypeId`) and the fully
//! parameterized `LogicalType` tree used to resolve column decoders.
//!
//! ## Type Categories
//!
//! | Category | Types | Slot Size |
//! |----------|-------|-----------|
//! | **Boolean** | BOOLEAN | 1 byte |
//! | **Integer** | TINYINT..BIGINT, UTINYINT..UBIGINT | 1, 2, 4, 8 bytes |
//! | **Float** | FLOAT, DOUBLE | 4, 8 bytes |
//! | **Wide** | HUGEINT, UHUGEINT, UUID | 16 bytes (two 64-bit halves) |
//! | **Date/Time** | DATE, TIME, TIME_TZ, INTERVAL | 4, 8, 8, 16 bytes |
//! | **Timestamp** | TIMESTAMP, _S, _MS, _NS, _TZ | 8 bytes |
//! | **Variable** | VARCHAR, BLOB, BIT, VARINT | 16-byte descriptor |
//! | **Parameterized** | DECIMAL(w,s), ENUM | physical integer chosen by engine |
//! | **Nested** | LIST, ARRAY, STRUCT, MAP, UNION | entries or children |
//!
//! ## Discriminant Values
//!
//! `TypeId` discriminants are the engine's own type numbers. They are not
//! contiguous (UHUGEINT = 32 was added after the nested types), so always
//! convert through [`TypeId::from_raw`].
//!
//! ## Physical Storage
//!
//! DECIMAL and ENUM are stored as plain integers whose width depends on the
//! type parameters:
//!
//! ```text
//! DECIMAL width  1..=4   -> SMALLINT      ENUM dictionary <= 2^8   -> UTINYINT
//! DECIMAL width  5..=9   -> INTEGER       ENUM dictionary <= 2^16  -> USMALLINT
//! DECIMAL width 10..=18  -> BIGINT        ENUM dictionary larger   -> UINTEGER
//! DECIMAL width 19..=38  -> HUGEINT
//! ```
//!
//! The engine reports the storage type per vector; [`LogicalType::storage_type`]
//! is the same rule for engines that build vectors themselves.

use std::fmt;

use eyre::Result;

use crate::config::MAX_NESTING_DEPTH;
use crate::error::CodecError;

/// Engine type tag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    Invalid = 0,
    Boolean = 1,
    TinyInt = 2,
    SmallInt = 3,
    Integer = 4,
    BigInt = 5,
    UTinyInt = 6,
    USmallInt = 7,
    UInteger = 8,
    UBigInt = 9,
    Float = 10,
    Double = 11,
    Timestamp = 12,
    Date = 13,
    Time = 14,
    Interval = 15,
    HugeInt = 16,
    Varchar = 17,
    Blob = 18,
    Decimal = 19,
    TimestampS = 20,
    TimestampMs = 21,
    TimestampNs = 22,
    Enum = 23,
    List = 24,
    Struct = 25,
    Map = 26,
    Uuid = 27,
    Union = 28,
    Bit = 29,
    TimeTz = 30,
    TimestampTz = 31,
    UHugeInt = 32,
    Array = 33,
    Any = 34,
    Varint = 35,
    SqlNull = 36,
}

impl TypeId {
    pub fn from_raw(raw: u8) -> Result<Self> {
        let id = match raw {
            0 => TypeId::Invalid,
            1 => TypeId::Boolean,
            2 => TypeId::TinyInt,
            3 => TypeId::SmallInt,
            4 => TypeId::Integer,
            5 => TypeId::BigInt,
            6 => TypeId::UTinyInt,
            7 => TypeId::USmallInt,
            8 => TypeId::UInteger,
            9 => TypeId::UBigInt,
            10 => TypeId::Float,
            11 => TypeId::Double,
            12 => TypeId::Timestamp,
            13 => TypeId::Date,
            14 => TypeId::Time,
            15 => TypeId::Interval,
            16 => TypeId::HugeInt,
            17 => TypeId::Varchar,
            18 => TypeId::Blob,
            19 => TypeId::Decimal,
            20 => TypeId::TimestampS,
            21 => TypeId::TimestampMs,
            22 => TypeId::TimestampNs,
            23 => TypeId::Enum,
            24 => TypeId::List,
            25 => TypeId::Struct,
            26 => TypeId::Map,
            27 => TypeId::Uuid,
            28 => TypeId::Union,
            29 => TypeId::Bit,
            30 => TypeId::TimeTz,
            31 => TypeId::TimestampTz,
            32 => TypeId::UHugeInt,
            33 => TypeId::Array,
            34 => TypeId::Any,
            35 => TypeId::Varint,
            36 => TypeId::SqlNull,
            other => {
                return Err(CodecError::malformed(format!("unknown type id {}", other)).into())
            }
        };
        Ok(id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeId::Invalid => "INVALID",
            TypeId::Boolean => "BOOLEAN",
            TypeId::TinyInt => "TINYINT",
            TypeId::SmallInt => "SMALLINT",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::UTinyInt => "UTINYINT",
            TypeId::USmallInt => "USMALLINT",
            TypeId::UInteger => "UINTEGER",
            TypeId::UBigInt => "UBIGINT",
            TypeId::Float => "FLOAT",
            TypeId::Double => "DOUBLE",
            TypeId::Timestamp => "TIMESTAMP",
            TypeId::Date => "DATE",
            TypeId::Time => "TIME",
            TypeId::Interval => "INTERVAL",
            TypeId::HugeInt => "HUGEINT",
            TypeId::Varchar => "VARCHAR",
            TypeId::Blob => "BLOB",
            TypeId::Decimal => "DECIMAL",
            TypeId::TimestampS => "TIMESTAMP_S",
            TypeId::TimestampMs => "TIMESTAMP_MS",
            TypeId::TimestampNs => "TIMESTAMP_NS",
            TypeId::Enum => "ENUM",
            TypeId::List => "LIST",
            TypeId::Struct => "STRUCT",
            TypeId::Map => "MAP",
            TypeId::Uuid => "UUID",
            TypeId::Union => "UNION",
            TypeId::Bit => "BIT",
            TypeId::TimeTz => "TIME WITH TIME ZONE",
            TypeId::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            TypeId::UHugeInt => "UHUGEINT",
            TypeId::Array => "ARRAY",
            TypeId::Any => "ANY",
            TypeId::Varint => "VARINT",
            TypeId::SqlNull => "NULL",
        }
    }

    /// Returns the byte size of one slot in a column buffer, or None for
    /// types without a flat slot (STRUCT, UNION, ARRAY keep data in children).
    pub fn slot_size(&self) -> Option<usize> {
        match self {
            TypeId::Boolean | TypeId::TinyInt | TypeId::UTinyInt => Some(1),
            TypeId::SmallInt | TypeId::USmallInt => Some(2),
            TypeId::Integer | TypeId::UInteger | TypeId::Float | TypeId::Date => Some(4),
            TypeId::BigInt
            | TypeId::UBigInt
            | TypeId::Double
            | TypeId::Time
            | TypeId::TimeTz
            | TypeId::Timestamp
            | TypeId::TimestampS
            | TypeId::TimestampMs
            | TypeId::TimestampNs
            | TypeId::TimestampTz => Some(8),
            TypeId::HugeInt | TypeId::UHugeInt | TypeId::Uuid | TypeId::Interval => Some(16),
            TypeId::Varchar | TypeId::Blob | TypeId::Bit | TypeId::Varint => Some(16),
            TypeId::List | TypeId::Map => Some(16),
            _ => None,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            TypeId::List | TypeId::Struct | TypeId::Map | TypeId::Array | TypeId::Union
        )
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully parameterized type of a column or nested child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalType {
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
    Timestamp,
    TimestampS,
    TimestampMs,
    TimestampNs,
    TimestampTz,
    Date,
    Time,
    TimeTz,
    Interval,
    HugeInt,
    UHugeInt,
    Varchar,
    Blob,
    Decimal { width: u8, scale: u8 },
    Enum { dictionary: Vec<String> },
    List(Box<LogicalType>),
    Array { child: Box<LogicalType>, size: usize },
    Struct(Vec<(String, LogicalType)>),
    Map { key: Box<LogicalType>, value: Box<LogicalType> },
    /// Members in declaration order. The wire form carries an extra leading
    /// UTINYINT tag child.
    Union(Vec<(String, LogicalType)>),
    Uuid,
    Bit,
    Varint,
    SqlNull,
}

impl LogicalType {
    pub fn list(child: LogicalType) -> Self {
        LogicalType::List(Box::new(child))
    }

    pub fn array(child: LogicalType, size: usize) -> Self {
        LogicalType::Array {
            child: Box::new(child),
            size,
        }
    }

    pub fn map(key: LogicalType, value: LogicalType) -> Self {
        LogicalType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, LogicalType)>) -> Self {
        LogicalType::Struct(fields.into_iter().map(|(n, t)| (n.into(), t)).collect())
    }

    pub fn union<N: Into<String>>(members: impl IntoIterator<Item = (N, LogicalType)>) -> Self {
        LogicalType::Union(members.into_iter().map(|(n, t)| (n.into(), t)).collect())
    }

    pub fn enumeration<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        LogicalType::Enum {
            dictionary: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> TypeId {
        match self {
            LogicalType::Boolean => TypeId::Boolean,
            LogicalType::TinyInt => TypeId::TinyInt,
            LogicalType::SmallInt => TypeId::SmallInt,
            LogicalType::Integer => TypeId::Integer,
            LogicalType::BigInt => TypeId::BigInt,
            LogicalType::UTinyInt => TypeId::UTinyInt,
            LogicalType::USmallInt => TypeId::USmallInt,
            LogicalType::UInteger => TypeId::UInteger,
            LogicalType::UBigInt => TypeId::UBigInt,
            LogicalType::Float => TypeId::Float,
            LogicalType::Double => TypeId::Double,
            LogicalType::Timestamp => TypeId::Timestamp,
            LogicalType::TimestampS => TypeId::TimestampS,
            LogicalType::TimestampMs => TypeId::TimestampMs,
            LogicalType::TimestampNs => TypeId::TimestampNs,
            LogicalType::TimestampTz => TypeId::TimestampTz,
            LogicalType::Date => TypeId::Date,
            LogicalType::Time => TypeId::Time,
            LogicalType::TimeTz => TypeId::TimeTz,
            LogicalType::Interval => TypeId::Interval,
            LogicalType::HugeInt => TypeId::HugeInt,
            LogicalType::UHugeInt => TypeId::UHugeInt,
            LogicalType::Varchar => TypeId::Varchar,
            LogicalType::Blob => TypeId::Blob,
            LogicalType::Decimal { .. } => TypeId::Decimal,
            LogicalType::Enum { .. } => TypeId::Enum,
            LogicalType::List(_) => TypeId::List,
            LogicalType::Array { .. } => TypeId::Array,
            LogicalType::Struct(_) => TypeId::Struct,
            LogicalType::Map { .. } => TypeId::Map,
            LogicalType::Union(_) => TypeId::Union,
            LogicalType::Uuid => TypeId::Uuid,
            LogicalType::Bit => TypeId::Bit,
            LogicalType::Varint => TypeId::Varint,
            LogicalType::SqlNull => TypeId::SqlNull,
        }
    }

    /// Builds the parameterless logical type for `id`.
    pub fn from_id(id: TypeId) -> Result<Self> {
        let logical = match id {
            TypeId::Boolean => LogicalType::Boolean,
            TypeId::TinyInt => LogicalType::TinyInt,
            TypeId::SmallInt => LogicalType::SmallInt,
            TypeId::Integer => LogicalType::Integer,
            TypeId::BigInt => LogicalType::BigInt,
            TypeId::UTinyInt => LogicalType::UTinyInt,
            TypeId::USmallInt => LogicalType::USmallInt,
            TypeId::UInteger => LogicalType::UInteger,
            TypeId::UBigInt => LogicalType::UBigInt,
            TypeId::Float => LogicalType::Float,
            TypeId::Double => LogicalType::Double,
            TypeId::Timestamp => LogicalType::Timestamp,
            TypeId::TimestampS => LogicalType::TimestampS,
            TypeId::TimestampMs => LogicalType::TimestampMs,
            TypeId::TimestampNs => LogicalType::TimestampNs,
            TypeId::TimestampTz => LogicalType::TimestampTz,
            TypeId::Date => LogicalType::Date,
            TypeId::Time => LogicalType::Time,
            TypeId::TimeTz => LogicalType::TimeTz,
            TypeId::Interval => LogicalType::Interval,
            TypeId::HugeInt => LogicalType::HugeInt,
            TypeId::UHugeInt => LogicalType::UHugeInt,
            TypeId::Varchar => LogicalType::Varchar,
            TypeId::Blob => LogicalType::Blob,
            TypeId::Uuid => LogicalType::Uuid,
            TypeId::Bit => LogicalType::Bit,
            TypeId::Varint => LogicalType::Varint,
            TypeId::SqlNull => LogicalType::SqlNull,
            other => return Err(CodecError::unsupported(other.name()).into()),
        };
        Ok(logical)
    }

    /// Physical storage type the engine uses for this logical type.
    pub fn storage_type(&self) -> TypeId {
        match self {
            LogicalType::Decimal { width, .. } => match width {
                0..=4 => TypeId::SmallInt,
                5..=9 => TypeId::Integer,
                10..=18 => TypeId::BigInt,
                _ => TypeId::HugeInt,
            },
            LogicalType::Enum { dictionary } => match dictionary.len() {
                0..=0x100 => TypeId::UTinyInt,
                0x101..=0x1_0000 => TypeId::USmallInt,
                _ => TypeId::UInteger,
            },
            other => other.id(),
        }
    }

    /// Ordered children as the engine lays them out.
    ///
    /// STRUCT exposes its fields, LIST and ARRAY a single element child, MAP a
    /// single `STRUCT(key, value)` child and UNION the tag followed by every
    /// member.
    pub fn children(&self) -> Vec<(String, LogicalType)> {
        match self {
            LogicalType::List(child) | LogicalType::Array { child, .. } => {
                vec![(String::new(), (**child).clone())]
            }
            LogicalType::Struct(fields) => fields.clone(),
            LogicalType::Map { key, value } => vec![(
                String::new(),
                LogicalType::Struct(vec![
                    ("key".to_string(), (**key).clone()),
                    ("value".to_string(), (**value).clone()),
                ]),
            )],
            LogicalType::Union(members) => {
                let mut children = Vec::with_capacity(members.len() + 1);
                children.push((String::new(), LogicalType::UTinyInt));
                children.extend(members.iter().cloned());
                children
            }
            _ => Vec::new(),
        }
    }

    /// Nesting depth of the type tree, 1 for scalars.
    pub fn depth(&self) -> usize {
        match self {
            LogicalType::List(child) | LogicalType::Array { child, .. } => 1 + child.depth(),
            LogicalType::Map { key, value } => 2 + key.depth().max(value.depth()),
            LogicalType::Struct(fields) | LogicalType::Union(fields) => {
                1 + fields.iter().map(|(_, t)| t.depth()).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    pub fn validate_depth(&self) -> Result<()> {
        let depth = self.depth();
        if depth > MAX_NESTING_DEPTH {
            return Err(CodecError::malformed(format!(
                "type nesting depth {} exceeds {}",
                depth, MAX_NESTING_DEPTH
            ))
            .into());
        }
        Ok(())
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[(String, LogicalType)]) -> fmt::Result {
    for (i, (name, ty)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{} {}", name, ty)?;
    }
    Ok(())
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Decimal { width, scale } => write!(f, "DECIMAL({},{})", width, scale),
            LogicalType::Enum { dictionary } => {
                f.write_str("ENUM(")?;
                for (i, entry) in dictionary.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}'", entry)?;
                }
                f.write_str(")")
            }
            LogicalType::List(child) => write!(f, "{}[]", child),
            LogicalType::Array { child, size } => write!(f, "{}[{}]", child, size),
            LogicalType::Struct(fields) => {
                f.write_str("STRUCT(")?;
                write_fields(f, fields)?;
                f.write_str(")")
            }
            LogicalType::Map { key, value } => write!(f, "MAP({}, {})", key, value),
            LogicalType::Union(members) => {
                f.write_str("UNION(")?;
                write_fields(f, members)?;
                f.write_str(")")
            }
            other => f.write_str(other.id().name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_round_trip_through_raw() {
        for raw in 0..=36u8 {
            let id = TypeId::from_raw(raw).unwrap();
            assert_eq!(id as u8, raw);
        }
        assert!(TypeId::from_raw(37).is_err());
    }

    #[test]
    fn decimal_storage_follows_width() {
        let storage = |width| LogicalType::Decimal { width, scale: 0 }.storage_type();
        assert_eq!(storage(4), TypeId::SmallInt);
        assert_eq!(storage(5), TypeId::Integer);
        assert_eq!(storage(9), TypeId::Integer);
        assert_eq!(storage(18), TypeId::BigInt);
        assert_eq!(storage(19), TypeId::HugeInt);
        assert_eq!(storage(38), TypeId::HugeInt);
    }

    #[test]
    fn enum_storage_follows_dictionary_size() {
        let small = LogicalType::enumeration(["a", "b"]);
        assert_eq!(small.storage_type(), TypeId::UTinyInt);

        let medium = LogicalType::enumeration((0..300).map(|i| i.to_string()));
        assert_eq!(medium.storage_type(), TypeId::USmallInt);

        let large = LogicalType::enumeration((0..70_000).map(|i| i.to_string()));
        assert_eq!(large.storage_type(), TypeId::UInteger);
    }

    #[test]
    fn union_children_start_with_tag() {
        let ty = LogicalType::union([("num", LogicalType::Integer), ("str", LogicalType::Varchar)]);
        let children = ty.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].1, LogicalType::UTinyInt);
        assert_eq!(children[2].0, "str");
    }

    #[test]
    fn display_renders_nested_types() {
        let ty = LogicalType::structure([
            ("a", LogicalType::list(LogicalType::Integer)),
            ("b", LogicalType::array(LogicalType::Varchar, 3)),
            ("c", LogicalType::map(LogicalType::Varchar, LogicalType::Decimal { width: 18, scale: 3 })),
        ]);
        assert_eq!(
            ty.to_string(),
            "STRUCT(a INTEGER[], b VARCHAR[3], c MAP(VARCHAR, DECIMAL(18,3)))"
        );
    }

    #[test]
    fn depth_counts_nested_levels() {
        assert_eq!(LogicalType::Integer.depth(), 1);
        let ty = LogicalType::list(LogicalType::structure([(
            "x",
            LogicalType::list(LogicalType::Integer),
        )]));
        assert_eq!(ty.depth(), 4);
    }
}

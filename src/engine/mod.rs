//! # Engine Boundary
//!
//! Traits describing the primitives this crate consumes from the analytical
//! engine, plus the owned [`NativeValue`] the encoder hands back to it.
//!
//! ```text
//! NativeEngine ──query──────> NativeResult ──fetch_chunk──> NativeChunk
//!      │                                                     │
//!      ├──prepare──> NativeStatement ──execute──┐            └─vector(i)─> NativeVector
//!      │                                        └─> NativeResult              │
//!      └──appender─> NativeAppender                               child(i) ───┘
//! ```
//!
//! Engine operations report failures as the engine's own error string, which
//! the session layer wraps into `CodecError::Engine`. Releasing a native
//! resource is `Drop`: a chunk is released when its box is dropped, a result
//! when the result set is closed or dropped.
//!
//! ## Vector Contract
//!
//! | Method         | Returns                                                   |
//! |----------------|-----------------------------------------------------------|
//! | `logical_type` | declared type, resolved once per decoder                  |
//! | `storage_type` | physical integer type of DECIMAL and ENUM, else the id    |
//! | `data`         | raw slot bytes, `row_count * slot_size` at least          |
//! | `validity`     | bitmap words or None when all rows are valid              |
//! | `child`        | nested child vectors (see `LogicalType::children`)        |
//! | `list_size`    | number of rows in the LIST/MAP child                      |
//! | `string_heap`  | out-of-line bytes referenced by a string descriptor       |
//!
//! [`memory`] provides an in-process engine that writes this exact layout.

pub mod memory;

use crate::types::{LogicalType, TypeId};

/// Native engine handle.
pub trait NativeEngine {
    fn query(&self, sql: &str) -> Result<Box<dyn NativeResult + '_>, String>;

    fn prepare(&self, sql: &str) -> Result<Box<dyn NativeStatement + '_>, String>;

    fn appender(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Box<dyn NativeAppender + '_>, String>;
}

/// Materialized query result, consumed chunk by chunk.
pub trait NativeResult {
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Option<&str>;

    fn column_type(&self, index: usize) -> Option<&LogicalType>;

    /// Next chunk, or None once the result is exhausted.
    fn fetch_chunk(&mut self) -> Option<Box<dyn NativeChunk>>;
}

pub trait NativeChunk {
    fn row_count(&self) -> usize;

    fn column_count(&self) -> usize;

    fn vector(&self, index: usize) -> Option<&dyn NativeVector>;
}

pub trait NativeVector {
    fn logical_type(&self) -> &LogicalType;

    fn storage_type(&self) -> TypeId;

    fn data(&self) -> &[u8];

    fn validity(&self) -> Option<&[u64]>;

    fn child(&self, index: usize) -> Option<&dyn NativeVector>;

    fn list_size(&self) -> usize;

    /// Resolves `len` bytes at `pointer` taken from a string descriptor of
    /// this vector.
    fn string_heap(&self, pointer: u64, len: usize) -> Option<&[u8]>;
}

pub trait NativeStatement {
    fn parameter_count(&self) -> usize;

    /// Binds a 1-based parameter.
    fn bind(&mut self, position: usize, value: NativeValue) -> Result<(), String>;

    fn execute(&mut self) -> Result<Box<dyn NativeResult + '_>, String>;
}

pub trait NativeAppender {
    fn append(&mut self, value: NativeValue) -> Result<(), String>;

    fn end_row(&mut self) -> Result<(), String>;

    fn flush(&mut self) -> Result<(), String>;
}

/// Owned value built for the engine's value constructors.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
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
    Varchar(String),
    Blob(Vec<u8>),
    /// Days since epoch.
    Date(i32),
    /// Micros since midnight.
    Time(i64),
    /// Packed micros and offset.
    TimeTz(u64),
    /// Micros since epoch. Also used for TIMESTAMP_S and TIMESTAMP_MS targets.
    Timestamp(i64),
    TimestampTz(i64),
    /// Nanos since epoch.
    TimestampNs(i64),
    Interval { months: i32, days: i32, micros: i64 },
    HugeInt { lower: u64, upper: i64 },
    UHugeInt { lower: u64, upper: u64 },
    /// Unbiased unsigned halves of the UUID.
    Uuid { lower: u64, upper: u64 },
}

impl NativeValue {
    pub fn type_id(&self) -> TypeId {
        match self {
            NativeValue::Null => TypeId::SqlNull,
            NativeValue::Boolean(_) => TypeId::Boolean,
            NativeValue::TinyInt(_) => TypeId::TinyInt,
            NativeValue::SmallInt(_) => TypeId::SmallInt,
            NativeValue::Integer(_) => TypeId::Integer,
            NativeValue::BigInt(_) => TypeId::BigInt,
            NativeValue::UTinyInt(_) => TypeId::UTinyInt,
            NativeValue::USmallInt(_) => TypeId::USmallInt,
            NativeValue::UInteger(_) => TypeId::UInteger,
            NativeValue::UBigInt(_) => TypeId::UBigInt,
            NativeValue::Float(_) => TypeId::Float,
            NativeValue::Double(_) => TypeId::Double,
            NativeValue::Varchar(_) => TypeId::Varchar,
            NativeValue::Blob(_) => TypeId::Blob,
            NativeValue::Date(_) => TypeId::Date,
            NativeValue::Time(_) => TypeId::Time,
            NativeValue::TimeTz(_) => TypeId::TimeTz,
            NativeValue::Timestamp(_) => TypeId::Timestamp,
            NativeValue::TimestampTz(_) => TypeId::TimestampTz,
            NativeValue::TimestampNs(_) => TypeId::TimestampNs,
            NativeValue::Interval { .. } => TypeId::Interval,
            NativeValue::HugeInt { .. } => TypeId::HugeInt,
            NativeValue::UHugeInt { .. } => TypeId::UHugeInt,
            NativeValue::Uuid { .. } => TypeId::Uuid,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }
}

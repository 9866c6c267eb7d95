//! # quackcodec - Vectorized Result Codec
//!
//! quackcodec decodes the column chunks produced by an embedded analytical
//! engine into owned Rust values, and encodes Rust values back into the
//! engine's native values for parameter binding and row appending.
//!
//! - **Chunk-at-a-time decoding**: one chunk is held at a time and released
//!   before the next one is fetched
//! - **Exact layouts**: string descriptors, list entries, 128-bit halves and
//!   packed times are read through zerocopy views
//! - **Pluggable wide arithmetic**: integers beyond 64 bits go through a
//!   numeric backend, `num-bigint` by default
//!
//! ## Quick Start
//!
//! ```ignore
//! use quackcodec::{MemoryEngine, Session, Value, LogicalType};
//!
//! let engine = MemoryEngine::new();
//! engine.create_table("users", [("id", LogicalType::Integer), ("name", LogicalType::Varchar)])?;
//! let session = Session::new(engine);
//!
//! let mut appender = session.appender(None, "users")?;
//! appender.append_row(&[Value::Integer(1), Value::from("Alice")])?;
//! appender.flush()?;
//! drop(appender);
//!
//! let mut result = session.query("SELECT * FROM users")?;
//! for row in result.rows() {
//!     let row = row?;
//!     println!("{} {}", row.get_i64(0)?, row.get_str(1)?);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Session / PreparedStatement /      │
//! │            Appender                  │
//! ├──────────────────┬──────────────────┤
//! │ ResultSet / Rows │  Value Encoder   │
//! ├──────────────────┴──────────────────┤
//! │  Vector Decoder + Nested Decoders    │
//! ├─────────────────────────────────────┤
//! │ Scalar │ Temporal │ Wide │ Varlen    │
//! ├─────────────────────────────────────┤
//! │   ABI views │ Validity │ Numeric     │
//! ├─────────────────────────────────────┤
//! │   Engine traits (NativeEngine ...)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: layout constants and `CodecConfig`
//! - [`error`]: `CodecError` and `codec_error`
//! - [`numeric`]: arbitrary-precision backend
//! - [`types`]: `TypeId`, `LogicalType`, `Value` and the value types
//! - [`abi`]: zerocopy views of the engine's slot structs
//! - [`codec`]: scalar, temporal, wide-integer and string codecs, the encoder
//! - [`vector`]: per-column decoding including nested types
//! - [`engine`]: engine traits and the in-process `memory` engine
//! - [`result`]: result sets, chunks, rows and column batches
//! - [`session`]: query, prepared statement and appender surface

#[macro_use]
mod macros;

pub mod abi;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod numeric;
pub mod result;
pub mod session;
pub mod types;
pub mod vector;

pub use config::{CalendarLimits, CodecConfig, CodecConfigBuilder};
pub use engine::memory::MemoryEngine;
pub use engine::{NativeEngine, NativeValue};
pub use error::{codec_error, CodecError};
pub use result::{ColumnBatch, DataChunk, ResultSet, ResultState, ResultStats, Row};
pub use session::{Appender, PreparedStatement, Session};
pub use types::{
    Blob, Date, Decimal, Interval, LogicalType, Time, TimePrecision, Timestamp, TypeId, Value,
    WideInteger,
};
pub use vector::{ColumnDecoder, Vector};

//! # Codec
//!
//! Leaf conversions between the engine's slot encodings and [`Value`]s.
//! The vector decoder dispatches into these per logical type; the session
//! layer uses [`ValueEncoder`] for the reverse direction.
//!
//! ```text
//! validity ─┐
//! scalar   ─┤
//! wide     ─┼──> vector::ColumnDecoder ──> Value
//! temporal ─┤
//! varlen   ─┘
//!
//! Value ──> encoder::ValueEncoder ──> NativeValue ──> engine
//! ```
//!
//! | Module     | Handles                                             |
//! |------------|-----------------------------------------------------|
//! | `validity` | null bitmap reads and the builder used by engines   |
//! | `scalar`   | booleans, integers and floats up to 64 bits         |
//! | `wide`     | HUGEINT, UHUGEINT, UUID, VARINT, BIT                |
//! | `temporal` | DATE, TIME, TIME_TZ, TIMESTAMP in all precisions    |
//! | `varlen`   | string descriptors, inline vs heap payloads         |
//! | `encoder`  | `Value` to `NativeValue`, with type inference       |
//!
//! [`Value`]: crate::types::Value

pub mod encoder;
pub mod scalar;
pub mod temporal;
pub mod validity;
pub mod varlen;
pub mod wide;

pub use encoder::{infer_type, ValueEncoder};
pub use validity::{covers_rows, is_valid, ValidityMask};
pub use varlen::{decode_varchar, describe, read_varlen};

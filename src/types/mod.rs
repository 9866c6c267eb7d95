//! # Codec Type System
//!
//! Types shared by the decode and encode paths.
//!
//! ## Module Structure
//!
//! - `data_type`: engine `TypeId` tags and the parameterized `LogicalType`
//! - `value`: the decoded `Value` enum
//! - `wide`: `WideInteger` for 128-bit and variable-width integers
//! - `decimal`: exact `Decimal` with width and scale
//! - `temporal`: `Date`, `Time`, `Timestamp`, `Interval`, `TimePrecision`
//! - `blob`: `Blob` with its escaped text form
//!
//! ## Key Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | `TypeId` | Engine type tag, dispatch key |
//! | `LogicalType` | Column type including parameters and children |
//! | `Value` | Owned decoded cell |
//! | `WideInteger` | Native `i64` or decimal string |

mod blob;
mod data_type;
mod decimal;
mod temporal;
mod value;
mod wide;

pub use blob::Blob;
pub use data_type::{LogicalType, TypeId};
pub use decimal::{Decimal, MAX_DECIMAL_WIDTH};
pub use temporal::{Date, Interval, Time, TimePrecision, Timestamp};
pub use value::Value;
pub use wide::WideInteger;

pub use uuid::Uuid;

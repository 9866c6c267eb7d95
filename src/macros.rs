//! # Internal Macros
//!
//! ## zerocopy_accessors!
//!
//! Generates getter and setter methods for fields of the zerocopy ABI structs
//! that use the little-endian wrapper types (`U32`, `U64`, `I32`, `I64`).
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::little_endian::{I64, U64};
//!
//! #[repr(C)]
//! struct HugeIntSlot {
//!     lower: U64,
//!     upper: I64,
//! }
//!
//! impl HugeIntSlot {
//!     zerocopy_accessors! {
//!         lower: u64,
//!         upper: i64,
//!     }
//! }
//!
//! // Generates:
//! // pub fn lower(&self) -> u64 { self.lower.get() }
//! // pub fn set_lower(&mut self, val: u64) { self.lower = val.into(); }
//! // pub fn upper(&self) -> i64 { self.upper.get() }
//! // pub fn set_upper(&mut self, val: i64) { self.upper = val.into(); }
//! ```

/// Generates getter and setter methods for zerocopy little-endian fields.
#[macro_export]
macro_rules! zerocopy_accessors {
    ($($field:ident : $ty:ty),* $(,)?) => {
        $(
            ::paste::paste! {
                #[inline]
                pub fn $field(&self) -> $ty {
                    self.$field.get()
                }

                #[inline]
                pub fn [<set_ $field>](&mut self, val: $ty) {
                    self.$field = val.into();
                }
            }
        )*
    };
}

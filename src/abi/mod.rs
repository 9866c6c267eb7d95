//! # Native Layout Views
//!
//! Zero-copy views of the fixed-size structs the engine writes into column
//! buffers. Every view is `#[repr(C)]`, alignment 1 (`Unaligned`) and read
//! directly from a slot of the raw column bytes with `ref_from_bytes`.
//!
//! ## String Descriptor (16 bytes)
//!
//! ```text
//! inlined (length <= 12):
//! +--------+------------------------------------+
//! | len u32| bytes[12] (first `len` are valid)  |
//! +--------+------------------------------------+
//!
//! pointer (length > 12):
//! +--------+-----------+------------------------+
//! | len u32| prefix[4] | pointer u64            |
//! +--------+-----------+------------------------+
//! ```
//!
//! ## Other Slots
//!
//! | Struct        | Layout                                  | Used by              |
//! |---------------|-----------------------------------------|----------------------|
//! | `ListEntry`   | offset u64, length u64                  | LIST, MAP            |
//! | `HugeIntSlot` | lower u64, upper i64                    | HUGEINT, UUID, DECIMAL(>18) |
//! | `UHugeIntSlot`| lower u64, upper u64                    | UHUGEINT             |
//! | `IntervalSlot`| months i32, days i32, micros i64        | INTERVAL             |
//! | packed u64    | micros << 24 \| (57599 - offset)        | TIME_TZ              |
//!
//! ## Endianness
//!
//! The engine writes host-endian data. This crate targets little-endian hosts
//! and reads every field through the zerocopy `little_endian` wrappers.

use eyre::Result;
use zerocopy::little_endian::{I32, I64, U32, U64};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{
    HUGEINT_SIZE, INTERVAL_SIZE, LIST_ENTRY_SIZE, STRING_DESCRIPTOR_SIZE, STRING_INLINE_LIMIT,
    STRING_LENGTH_SIZE, STRING_PREFIX_SIZE, TIME_TZ_MAX_OFFSET, TIME_TZ_OFFSET_BITS,
};
use crate::error::CodecError;

/// Returns the `size`-byte slot of `row`.
pub fn slot(data: &[u8], row: usize, size: usize) -> Result<&[u8]> {
    let start = row
        .checked_mul(size)
        .ok_or_else(|| CodecError::malformed(format!("row {} overflows slot offset", row)))?;
    let end = start
        .checked_add(size)
        .ok_or_else(|| CodecError::malformed(format!("row {} overflows slot offset", row)))?;
    data.get(start..end).ok_or_else(|| {
        CodecError::malformed(format!(
            "column buffer of {} bytes has no {}-byte slot for row {}",
            data.len(),
            size,
            row
        ))
        .into()
    })
}

/// Reads a fixed-width slot as a byte array.
pub fn read_array<const N: usize>(data: &[u8], row: usize) -> Result<[u8; N]> {
    let bytes = slot(data, row, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct StringDescriptor {
    length: U32,
    prefix: [u8; STRING_PREFIX_SIZE],
    pointer: U64,
}

const _: () = assert!(std::mem::size_of::<StringDescriptor>() == STRING_DESCRIPTOR_SIZE);

impl StringDescriptor {
    crate::zerocopy_accessors! {
        length: u32,
        pointer: u64,
    }

    pub fn at(data: &[u8], row: usize) -> Result<&Self> {
        let bytes = slot(data, row, STRING_DESCRIPTOR_SIZE)?;
        Self::ref_from_bytes(bytes)
            .map_err(|e| CodecError::malformed(format!("string descriptor: {:?}", e)).into())
    }

    /// Descriptor holding `bytes` inline. Caller guarantees the length limit.
    pub fn inlined(bytes: &[u8]) -> Self {
        let mut descriptor = Self::new_zeroed();
        let len = bytes.len().min(STRING_INLINE_LIMIT);
        descriptor.set_length(len as u32);
        descriptor.as_mut_bytes()[STRING_LENGTH_SIZE..STRING_LENGTH_SIZE + len]
            .copy_from_slice(&bytes[..len]);
        descriptor
    }

    /// Descriptor referencing `length` bytes at `pointer`.
    pub fn pointed(length: u32, prefix: [u8; STRING_PREFIX_SIZE], pointer: u64) -> Self {
        Self {
            length: length.into(),
            prefix,
            pointer: pointer.into(),
        }
    }

    pub fn is_inlined(&self) -> bool {
        self.length() as usize <= STRING_INLINE_LIMIT
    }

    /// Inline payload. Only meaningful when [`is_inlined`](Self::is_inlined).
    pub fn inline_bytes(&self) -> &[u8] {
        let len = (self.length() as usize).min(STRING_INLINE_LIMIT);
        &self.as_bytes()[STRING_LENGTH_SIZE..STRING_LENGTH_SIZE + len]
    }

    pub fn prefix(&self) -> [u8; STRING_PREFIX_SIZE] {
        self.prefix
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ListEntry {
    offset: U64,
    length: U64,
}

const _: () = assert!(std::mem::size_of::<ListEntry>() == LIST_ENTRY_SIZE);

impl ListEntry {
    crate::zerocopy_accessors! {
        offset: u64,
        length: u64,
    }

    pub fn new(offset: u64, length: u64) -> Self {
        Self {
            offset: offset.into(),
            length: length.into(),
        }
    }

    pub fn at(data: &[u8], row: usize) -> Result<&Self> {
        let bytes = slot(data, row, LIST_ENTRY_SIZE)?;
        Self::ref_from_bytes(bytes)
            .map_err(|e| CodecError::malformed(format!("list entry: {:?}", e)).into())
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct HugeIntSlot {
    lower: U64,
    upper: I64,
}

const _: () = assert!(std::mem::size_of::<HugeIntSlot>() == HUGEINT_SIZE);

impl HugeIntSlot {
    crate::zerocopy_accessors! {
        lower: u64,
        upper: i64,
    }

    pub fn new(lower: u64, upper: i64) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn at(data: &[u8], row: usize) -> Result<&Self> {
        let bytes = slot(data, row, HUGEINT_SIZE)?;
        Self::ref_from_bytes(bytes)
            .map_err(|e| CodecError::malformed(format!("hugeint slot: {:?}", e)).into())
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct UHugeIntSlot {
    lower: U64,
    upper: U64,
}

const _: () = assert!(std::mem::size_of::<UHugeIntSlot>() == HUGEINT_SIZE);

impl UHugeIntSlot {
    crate::zerocopy_accessors! {
        lower: u64,
        upper: u64,
    }

    pub fn new(lower: u64, upper: u64) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn at(data: &[u8], row: usize) -> Result<&Self> {
        let bytes = slot(data, row, HUGEINT_SIZE)?;
        Self::ref_from_bytes(bytes)
            .map_err(|e| CodecError::malformed(format!("uhugeint slot: {:?}", e)).into())
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct IntervalSlot {
    months: I32,
    days: I32,
    micros: I64,
}

const _: () = assert!(std::mem::size_of::<IntervalSlot>() == INTERVAL_SIZE);

impl IntervalSlot {
    crate::zerocopy_accessors! {
        months: i32,
        days: i32,
        micros: i64,
    }

    pub fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months: months.into(),
            days: days.into(),
            micros: micros.into(),
        }
    }

    pub fn at(data: &[u8], row: usize) -> Result<&Self> {
        let bytes = slot(data, row, INTERVAL_SIZE)?;
        Self::ref_from_bytes(bytes)
            .map_err(|e| CodecError::malformed(format!("interval slot: {:?}", e)).into())
    }
}

const TIME_TZ_OFFSET_MASK: u64 = (1 << TIME_TZ_OFFSET_BITS) - 1;

/// Splits a packed TIME_TZ into `(micros since midnight, offset seconds)`.
pub fn unpack_time_tz(bits: u64) -> (i64, i32) {
    let micros = (bits >> TIME_TZ_OFFSET_BITS) as i64;
    let encoded = (bits & TIME_TZ_OFFSET_MASK) as i32;
    (micros, TIME_TZ_MAX_OFFSET - encoded)
}

pub fn pack_time_tz(micros: i64, offset_seconds: i32) -> u64 {
    ((micros as u64) << TIME_TZ_OFFSET_BITS)
        | ((TIME_TZ_MAX_OFFSET - offset_seconds) as u64 & TIME_TZ_OFFSET_MASK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inlined_descriptor_keeps_bytes_after_length() {
        let descriptor = StringDescriptor::inlined(b"hello world!");
        assert_eq!(descriptor.length(), 12);
        assert!(descriptor.is_inlined());
        assert_eq!(descriptor.inline_bytes(), b"hello world!");
        assert_eq!(&descriptor.as_bytes()[..4], &12u32.to_le_bytes());
    }

    #[test]
    fn pointed_descriptor_layout() {
        let descriptor = StringDescriptor::pointed(13, *b"hell", 0x1122_3344_5566_7788);
        let bytes = descriptor.as_bytes();
        assert_eq!(&bytes[4..8], b"hell");
        assert_eq!(&bytes[8..16], &0x1122_3344_5566_7788u64.to_le_bytes());
        assert!(!descriptor.is_inlined());
    }

    #[test]
    fn slot_reports_short_buffers() {
        let data = [0u8; 20];
        assert!(slot(&data, 1, 16).is_err());
        assert!(slot(&data, 0, 16).is_ok());
        assert!(ListEntry::at(&data, 2).is_err());
    }

    #[test]
    fn hugeint_slot_reads_halves() {
        let mut data = Vec::new();
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        data.extend_from_slice(&i64::MAX.to_le_bytes());
        let slot = HugeIntSlot::at(&data, 0).unwrap();
        assert_eq!(slot.lower(), u64::MAX);
        assert_eq!(slot.upper(), i64::MAX);
    }

    #[test]
    fn time_tz_packing_round_trips() {
        let micros = 49_530_123_456;
        for offset in [0, 3600, -19_800, TIME_TZ_MAX_OFFSET, -TIME_TZ_MAX_OFFSET] {
            assert_eq!(unpack_time_tz(pack_time_tz(micros, offset)), (micros, offset));
        }
    }

    #[test]
    fn time_tz_zero_offset_encodes_max_offset() {
        assert_eq!(pack_time_tz(0, 0), TIME_TZ_MAX_OFFSET as u64);
    }
}

//! # Wire Format Constants
//!
//! This module centralizes the constants of the engine's in-memory result
//! layout. They are properties of the native ABI, not tuning knobs: changing
//! one of the layout sizes corrupts every column decoded afterwards. Constants
//! that depend on each other are co-located and checked at compile time.
//!
//! ## Dependency Graph
//!
//! ```text
//! STRING_DESCRIPTOR_SIZE (16 bytes)
//!       │
//!       ├─> STRING_LENGTH_SIZE (4 bytes, u32 length prefix)
//!       │
//!       └─> STRING_INLINE_LIMIT (12 bytes, derived: descriptor - length)
//!             Values of at most this many bytes live inside the descriptor.
//!             Longer values keep a 4-byte prefix and an 8-byte pointer.
//!
//! VALIDITY_WORD_BITS (64)
//!       │
//!       └─> STANDARD_VECTOR_SIZE (2048) must be a multiple so a full chunk
//!             occupies whole validity words.
//!
//! DEFAULT_CALENDAR_DIGIT_LIMIT (14)
//!       │
//!       └─> DEFAULT_CALENDAR_STEP (13 nines) must have fewer digits than the
//!             limit or every chunked step would itself need chunking.
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use quackcodec::config::{STRING_INLINE_LIMIT, STRING_DESCRIPTOR_SIZE};
//! ```

// ============================================================================
// VARIABLE-LENGTH CELLS
// ============================================================================

/// Size of one string/blob descriptor slot in a column buffer.
pub const STRING_DESCRIPTOR_SIZE: usize = 16;

/// Size of the u32 length that starts every descriptor.
pub const STRING_LENGTH_SIZE: usize = 4;

/// Longest value stored inline in the descriptor. Hard constant of the wire
/// format.
pub const STRING_INLINE_LIMIT: usize = STRING_DESCRIPTOR_SIZE - STRING_LENGTH_SIZE;

/// Bytes of an out-of-line value copied into the descriptor as a prefix.
pub const STRING_PREFIX_SIZE: usize = 4;

const _: () = assert!(STRING_INLINE_LIMIT == 12, "inline string limit is fixed at 12 bytes");

const _: () = assert!(
    STRING_LENGTH_SIZE + STRING_PREFIX_SIZE + 8 == STRING_DESCRIPTOR_SIZE,
    "pointer descriptor must be length + prefix + 8-byte pointer"
);

// ============================================================================
// FIXED-WIDTH SLOTS
// ============================================================================

/// Size of a list entry (u64 offset + u64 length).
pub const LIST_ENTRY_SIZE: usize = 16;

/// Size of a 128-bit integer slot (u64 lower + 64-bit upper).
pub const HUGEINT_SIZE: usize = 16;

/// Size of an interval slot (i32 months + i32 days + i64 micros).
pub const INTERVAL_SIZE: usize = 16;

/// Size of a packed TIME WITH TIME ZONE slot.
pub const TIME_TZ_SIZE: usize = 8;

// ============================================================================
// CHUNK AND VALIDITY LAYOUT
// ============================================================================

/// Bits per validity word.
pub const VALIDITY_WORD_BITS: usize = 64;

/// Maximum number of rows in one chunk.
pub const STANDARD_VECTOR_SIZE: usize = 2048;

const _: () = assert!(
    STANDARD_VECTOR_SIZE % VALIDITY_WORD_BITS == 0,
    "a full chunk must occupy whole validity words"
);

// ============================================================================
// TEMPORAL SENTINELS
// ============================================================================

/// Raw microsecond value of `-infinity` timestamps.
pub const TIMESTAMP_NEG_INFINITY: i64 = i64::MIN + 1;

/// Raw microsecond value of `+infinity` timestamps.
pub const TIMESTAMP_POS_INFINITY: i64 = i64::MAX;

/// Largest UTC offset magnitude (seconds) a TIME WITH TIME ZONE can carry.
/// The packed form stores `TIME_TZ_MAX_OFFSET - offset` in the low 24 bits.
pub const TIME_TZ_MAX_OFFSET: i32 = 16 * 60 * 60 - 1;

/// Number of low bits of a packed TIME WITH TIME ZONE holding the offset.
pub const TIME_TZ_OFFSET_BITS: u32 = 24;

const _: () = assert!(
    (2 * TIME_TZ_MAX_OFFSET as i64) < (1i64 << TIME_TZ_OFFSET_BITS),
    "encoded offset must fit the low offset bits"
);

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;
pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// ============================================================================
// CALENDAR ARITHMETIC
// Offsets added to the epoch are applied in bounded steps once they reach
// the digit limit.
// ============================================================================

/// Offsets with at least this many decimal digits are applied in steps.
pub const DEFAULT_CALENDAR_DIGIT_LIMIT: u32 = 14;

/// Step size used for chunked offset application.
pub const DEFAULT_CALENDAR_STEP: i64 = 9_999_999_999_999;

const _: () = assert!(
    DEFAULT_CALENDAR_STEP < 10i64.pow(DEFAULT_CALENDAR_DIGIT_LIMIT),
    "a single calendar step must stay below the digit limit"
);

// ============================================================================
// NESTING
// ============================================================================

/// Maximum nesting depth of LIST/STRUCT/MAP/ARRAY/UNION types accepted when
/// resolving a column decoder.
pub const MAX_NESTING_DEPTH: usize = 32;

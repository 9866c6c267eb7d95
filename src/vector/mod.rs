//! # Vector Decoding
//!
//! A [`Vector`] is the decoded view over one column of a chunk. Its
//! [`ColumnDecoder`] is resolved once from the native type tree when the
//! view is built, so rows are decoded without re-inspecting type tags.
//!
//! ```text
//! NativeVector ──resolve──> ColumnDecoder (tree mirrors the child vectors)
//!       │                          │
//!       └────────── Vector<'c> ────┘
//!                     │
//!          value_at(row) / values()
//! ```
//!
//! ## Lifetimes
//!
//! `Vector<'c>` borrows the native vector of a chunk for `'c`. A chunk is
//! released when its owner drops it, and the borrow checker rejects any
//! vector still alive at that point.
//!
//! ## Nulls
//!
//! Validity is checked before any slot is read, at every nesting level. A
//! null row never touches its slot bytes, which may hold garbage.

mod decoder;
mod nested;

pub use decoder::ColumnDecoder;

use eyre::Result;

use crate::codec::covers_rows;
use crate::config::CodecConfig;
use crate::engine::NativeVector;
use crate::error::CodecError;
use crate::types::{LogicalType, Value};

pub struct Vector<'c> {
    native: &'c dyn NativeVector,
    decoder: ColumnDecoder,
    rows: usize,
    config: &'c CodecConfig,
}

impl<'c> Vector<'c> {
    pub fn new(native: &'c dyn NativeVector, rows: usize, config: &'c CodecConfig) -> Result<Self> {
        check_validity(native, rows)?;
        Ok(Self {
            decoder: ColumnDecoder::resolve(native)?,
            native,
            rows,
            config,
        })
    }

    pub fn logical_type(&self) -> &LogicalType {
        self.native.logical_type()
    }

    pub fn decoder(&self) -> &ColumnDecoder {
        &self.decoder
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn value_at(&self, row: usize) -> Result<Value> {
        if row >= self.rows {
            return Err(CodecError::malformed(format!(
                "row {} requested from a vector of {} rows",
                row, self.rows
            ))
            .into());
        }
        self.decoder.decode(self.native, row, self.config)
    }

    /// Decodes every row, nested children in one pass each.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.decoder.decode_rows(self.native, 0..self.rows, self.config)
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Value>> + '_ {
        (0..self.rows).map(move |row| self.value_at(row))
    }
}

/// Fails when the validity bitmap of `native` is shorter than `rows`.
pub(crate) fn check_validity(native: &dyn NativeVector, rows: usize) -> Result<()> {
    if covers_rows(native.validity(), rows) {
        return Ok(());
    }
    Err(CodecError::malformed(format!(
        "{} vector of {} rows has a validity bitmap of {} words",
        native.logical_type(),
        rows,
        native.validity().map_or(0, <[u64]>::len)
    ))
    .into())
}

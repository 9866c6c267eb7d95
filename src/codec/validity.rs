//! Validity bitmaps.
//!
//! Row `i` is non-null when bit `i % 64` of word `i / 64` is set. An absent
//! bitmap means every row is valid.
//!
//! [`is_valid`] reads rows past the end of a short bitmap as valid. Child
//! vectors carry no row count of their own, so only top-level vectors are
//! checked up front with [`covers_rows`].

use crate::config::VALIDITY_WORD_BITS;

/// Returns true if `row` is non-null. Rows past the last word are valid.
#[inline]
pub fn is_valid(validity: Option<&[u64]>, row: usize) -> bool {
    match validity {
        None => true,
        Some(words) => words
            .get(row / VALIDITY_WORD_BITS)
            .map_or(true, |word| word & (1u64 << (row % VALIDITY_WORD_BITS)) != 0),
    }
}

/// Returns true if `validity` has a bit for each of `rows` rows.
pub fn covers_rows(validity: Option<&[u64]>, rows: usize) -> bool {
    validity.map_or(true, |words| words.len() >= rows.div_ceil(VALIDITY_WORD_BITS))
}

/// Incrementally built bitmap, used by engines that write column buffers.
#[derive(Debug, Clone, Default)]
pub struct ValidityMask {
    words: Vec<u64>,
    len: usize,
    null_count: usize,
}

impl ValidityMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, valid: bool) {
        let row = self.len;
        if row % VALIDITY_WORD_BITS == 0 {
            self.words.push(0);
        }
        if valid {
            self.words[row / VALIDITY_WORD_BITS] |= 1u64 << (row % VALIDITY_WORD_BITS);
        } else {
            self.null_count += 1;
        }
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Words of the bitmap, or None when no row is null.
    pub fn into_words(self) -> Option<Vec<u64>> {
        if self.null_count == 0 {
            None
        } else {
            Some(self.words)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_bitmap_is_all_valid() {
        assert!(is_valid(None, 0));
        assert!(is_valid(None, 10_000));
    }

    #[test]
    fn reads_bits_across_words() {
        let words = [0b101u64, 1u64 << 63];
        assert!(is_valid(Some(&words), 0));
        assert!(!is_valid(Some(&words), 1));
        assert!(is_valid(Some(&words), 2));
        assert!(!is_valid(Some(&words), 64));
        assert!(is_valid(Some(&words), 127));
    }

    #[test]
    fn short_bitmap_does_not_cover_rows() {
        let words = [u64::MAX];
        assert!(covers_rows(None, 10_000));
        assert!(covers_rows(Some(&words), 64));
        assert!(!covers_rows(Some(&words), 65));
        assert!(covers_rows(Some(&[]), 0));
        assert!(is_valid(Some(&words), 100));
    }

    #[test]
    fn mask_without_nulls_has_no_words() {
        let mut mask = ValidityMask::new();
        for _ in 0..70 {
            mask.push(true);
        }
        assert_eq!(mask.len(), 70);
        assert!(mask.into_words().is_none());
    }

    #[test]
    fn mask_with_nulls_matches_reader() {
        let mut mask = ValidityMask::new();
        let pattern: Vec<bool> = (0..130).map(|i| i % 3 != 0).collect();
        for valid in &pattern {
            mask.push(*valid);
        }
        assert_eq!(mask.null_count(), 44);
        let words = mask.into_words().unwrap();
        assert_eq!(words.len(), 3);
        for (row, valid) in pattern.iter().enumerate() {
            assert_eq!(is_valid(Some(&words), row), *valid, "row {}", row);
        }
    }
}

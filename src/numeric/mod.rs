//! # Numeric Backend
//!
//! Arbitrary-precision integer arithmetic over decimal strings. The codec only
//! needs a handful of operations to reconstruct 128-bit integers, variable
//! width integers and to split large values back into wire halves, so the
//! interface is intentionally narrow:
//!
//! | Operation | Semantics                                         |
//! |-----------|---------------------------------------------------|
//! | add       | `a + b`                                           |
//! | sub       | `a - b`                                           |
//! | mul       | `a * b`                                           |
//! | div       | `a / b`, truncated toward zero                    |
//! | rem       | `a % b`, sign follows `a`                         |
//! | divmod    | `(floor(a / b), a - b * floor(a / b))`            |
//! | pow       | `base ^ exponent`                                 |
//! | compare   | total order of the two values                     |
//!
//! The backend is optional. [`default_backend`] returns `None` when the crate
//! is built without the `bignum` feature, and every caller must turn that into
//! `CodecError::BigNumbersUnavailable` before starting the computation (see
//! [`require`]).
//!
//! Values are passed as canonical decimal strings (`-?[0-9]+`, no leading
//! zeros except for `0`), which is also the representation of
//! `WideInteger::Big`.

#[cfg(feature = "bignum")]
mod bigint;

#[cfg(feature = "bignum")]
pub use bigint::BigIntBackend;

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use eyre::Result;

use crate::error::CodecError;

/// 2^64 as a decimal string.
pub const TWO_POW_64: &str = "18446744073709551616";

/// 2^63 as a decimal string.
pub const TWO_POW_63: &str = "9223372036854775808";

/// Arbitrary-precision arithmetic provider.
pub trait NumericBackend: Send + Sync + fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn add(&self, a: &str, b: &str) -> Result<String>;

    fn sub(&self, a: &str, b: &str) -> Result<String>;

    fn mul(&self, a: &str, b: &str) -> Result<String>;

    fn div(&self, a: &str, b: &str) -> Result<String>;

    fn rem(&self, a: &str, b: &str) -> Result<String>;

    /// Floored division returning `(quotient, modulus)`.
    fn divmod(&self, a: &str, b: &str) -> Result<(String, String)>;

    fn pow(&self, base: &str, exponent: u32) -> Result<String>;

    fn compare(&self, a: &str, b: &str) -> Result<Ordering>;
}

/// Returns the backend compiled into this build, if any.
pub fn default_backend() -> Option<Arc<dyn NumericBackend>> {
    #[cfg(feature = "bignum")]
    {
        Some(Arc::new(BigIntBackend))
    }
    #[cfg(not(feature = "bignum"))]
    {
        None
    }
}

/// Unwraps an optional backend or fails with `BigNumbersUnavailable`.
pub fn require<'a>(
    backend: Option<&'a dyn NumericBackend>,
    operation: &str,
) -> Result<&'a dyn NumericBackend> {
    match backend {
        Some(backend) => Ok(backend),
        None => Err(CodecError::big_numbers(operation).into()),
    }
}

/// Checks that `value` is a canonical decimal integer string.
pub fn is_decimal_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    !(value.starts_with('-') && digits == "0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_without_backend_is_big_numbers_unavailable() {
        let err = require(None, "hugeint decode").unwrap_err();
        assert!(matches!(
            crate::error::codec_error(&err),
            Some(CodecError::BigNumbersUnavailable { .. })
        ));
    }

    #[test]
    fn decimal_integer_shape() {
        assert!(is_decimal_integer("0"));
        assert!(is_decimal_integer("-170141183460469231731687303715884105728"));
        assert!(!is_decimal_integer("-0"));
        assert!(!is_decimal_integer("007"));
        assert!(!is_decimal_integer("12a"));
        assert!(!is_decimal_integer(""));
        assert!(!is_decimal_integer("-"));
    }

    #[test]
    fn precomputed_powers_match_native() {
        assert_eq!(TWO_POW_64, (1u128 << 64).to_string());
        assert_eq!(TWO_POW_63, (1u128 << 63).to_string());
    }
}

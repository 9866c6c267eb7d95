//! Integers wider than 64 bits.
//!
//! A [`WideInteger`] stays native while it fits an `i64` and is otherwise
//! carried as a canonical decimal string produced by the numeric backend.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use eyre::Result;

use crate::error::CodecError;
use crate::numeric::is_decimal_integer;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WideInteger {
    Native(i64),
    /// Decimal string of a value outside the `i64` range. Encoders pass it
    /// through [`WideInteger::normalized`] first.
    Big(String),
}

impl WideInteger {
    /// Normalizes a decimal string, choosing the native form when it fits.
    pub fn from_decimal(value: &str) -> Result<Self> {
        if !is_decimal_integer(value) {
            return Err(CodecError::malformed(format!("'{}' is not a decimal integer", value)).into());
        }
        Ok(match value.parse::<i64>() {
            Ok(native) => WideInteger::Native(native),
            Err(_) => WideInteger::Big(value.to_string()),
        })
    }

    /// Native form when the value fits `i64`. A `Big` string is validated.
    pub fn normalized(&self) -> Result<Self> {
        match self {
            WideInteger::Native(v) => Ok(WideInteger::Native(*v)),
            WideInteger::Big(decimal) => WideInteger::from_decimal(decimal),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, WideInteger::Native(_))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WideInteger::Native(v) => Some(*v),
            WideInteger::Big(_) => None,
        }
    }

    /// Exact value as `i128`, if it fits.
    pub fn to_i128(&self) -> Option<i128> {
        match self {
            WideInteger::Native(v) => Some(*v as i128),
            WideInteger::Big(s) => s.parse().ok(),
        }
    }

    /// Exact value as `u128`, if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        match self {
            WideInteger::Native(v) => u128::try_from(*v).ok(),
            WideInteger::Big(s) => s.parse().ok(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            WideInteger::Native(v) => *v < 0,
            WideInteger::Big(s) => s.starts_with('-'),
        }
    }

    pub fn to_decimal_string(&self) -> String {
        self.to_string()
    }
}

impl From<i64> for WideInteger {
    fn from(value: i64) -> Self {
        WideInteger::Native(value)
    }
}

impl From<i128> for WideInteger {
    fn from(value: i128) -> Self {
        match i64::try_from(value) {
            Ok(native) => WideInteger::Native(native),
            Err(_) => WideInteger::Big(value.to_string()),
        }
    }
}

impl From<u128> for WideInteger {
    fn from(value: u128) -> Self {
        match i64::try_from(value) {
            Ok(native) => WideInteger::Native(native),
            Err(_) => WideInteger::Big(value.to_string()),
        }
    }
}

impl FromStr for WideInteger {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        WideInteger::from_decimal(s)
    }
}

impl fmt::Display for WideInteger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WideInteger::Native(v) => write!(f, "{}", v),
            WideInteger::Big(s) => f.write_str(s),
        }
    }
}

impl PartialOrd for WideInteger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WideInteger {
    fn cmp(&self, other: &Self) -> Ordering {
        let key = |w: &WideInteger| -> (bool, usize) {
            let s = w.to_string();
            let negative = s.starts_with('-');
            (negative, s.trim_start_matches('-').len())
        };
        let (a_neg, a_len) = key(self);
        let (b_neg, b_len) = key(other);
        match (a_neg, b_neg) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (negative, _) => {
                let a = self.to_string();
                let b = other.to_string();
                let magnitude = a_len
                    .cmp(&b_len)
                    .then_with(|| a.trim_start_matches('-').cmp(b.trim_start_matches('-')));
                if negative {
                    magnitude.reverse()
                } else {
                    magnitude
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_decimal_prefers_native() {
        assert_eq!(
            WideInteger::from_decimal("9223372036854775807").unwrap(),
            WideInteger::Native(i64::MAX)
        );
        assert_eq!(
            WideInteger::from_decimal("9223372036854775808").unwrap(),
            WideInteger::Big("9223372036854775808".into())
        );
    }

    #[test]
    fn from_decimal_rejects_garbage() {
        assert!(WideInteger::from_decimal("1e10").is_err());
        assert!(WideInteger::from_decimal("+5").is_err());
    }

    #[test]
    fn ordering_handles_sign_and_magnitude() {
        let mut values: Vec<WideInteger> = [
            "18446744073709551616",
            "-170141183460469231731687303715884105728",
            "0",
            "-9223372036854775809",
            "9223372036854775808",
        ]
        .iter()
        .map(|s| WideInteger::from_decimal(s).unwrap())
        .collect();
        values.sort();
        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "-170141183460469231731687303715884105728",
                "-9223372036854775809",
                "0",
                "9223372036854775808",
                "18446744073709551616",
            ]
        );
    }

    #[test]
    fn converts_to_native_128_bit_when_in_range() {
        let max = WideInteger::from(i128::MAX);
        assert_eq!(max.to_i128(), Some(i128::MAX));
        assert_eq!(WideInteger::from(u128::MAX).to_i128(), None);
        assert_eq!(WideInteger::Native(-1).to_u128(), None);
    }
}

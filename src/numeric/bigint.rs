//! `num-bigint` implementation of [`NumericBackend`].

use std::cmp::Ordering;
use std::str::FromStr;

use eyre::{ensure, eyre, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Pow, Zero};

use super::NumericBackend;

#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntBackend;

fn parse(value: &str) -> Result<BigInt> {
    BigInt::from_str(value).map_err(|e| eyre!("invalid decimal integer '{}': {}", value, e))
}

fn parse_divisor(value: &str) -> Result<BigInt> {
    let divisor = parse(value)?;
    ensure!(!divisor.is_zero(), "division by zero");
    Ok(divisor)
}

impl NumericBackend for BigIntBackend {
    fn name(&self) -> &'static str {
        "num-bigint"
    }

    fn add(&self, a: &str, b: &str) -> Result<String> {
        Ok((parse(a)? + parse(b)?).to_string())
    }

    fn sub(&self, a: &str, b: &str) -> Result<String> {
        Ok((parse(a)? - parse(b)?).to_string())
    }

    fn mul(&self, a: &str, b: &str) -> Result<String> {
        Ok((parse(a)? * parse(b)?).to_string())
    }

    fn div(&self, a: &str, b: &str) -> Result<String> {
        let divisor = parse_divisor(b)?;
        Ok((parse(a)? / divisor).to_string())
    }

    fn rem(&self, a: &str, b: &str) -> Result<String> {
        let divisor = parse_divisor(b)?;
        Ok((parse(a)? % divisor).to_string())
    }

    fn divmod(&self, a: &str, b: &str) -> Result<(String, String)> {
        let divisor = parse_divisor(b)?;
        let (quotient, modulus) = parse(a)?.div_mod_floor(&divisor);
        Ok((quotient.to_string(), modulus.to_string()))
    }

    fn pow(&self, base: &str, exponent: u32) -> Result<String> {
        Ok(Pow::pow(parse(base)?, exponent).to_string())
    }

    fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(parse(a)?.cmp(&parse(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divmod_is_floored_for_negative_dividend() {
        let backend = BigIntBackend;
        let (q, r) = backend.divmod("-1", "18446744073709551616").unwrap();
        assert_eq!(q, "-1");
        assert_eq!(r, "18446744073709551615");
    }

    #[test]
    fn div_and_rem_truncate() {
        let backend = BigIntBackend;
        assert_eq!(backend.div("-7", "2").unwrap(), "-3");
        assert_eq!(backend.rem("-7", "2").unwrap(), "-1");
    }

    #[test]
    fn pow_builds_two_pow_127() {
        let backend = BigIntBackend;
        assert_eq!(
            backend.pow("2", 127).unwrap(),
            "170141183460469231731687303715884105728"
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(BigIntBackend.divmod("1", "0").is_err());
    }

    #[test]
    fn compare_orders_across_sign() {
        let backend = BigIntBackend;
        assert_eq!(
            backend.compare("-18446744073709551616", "1").unwrap(),
            Ordering::Less
        );
    }
}

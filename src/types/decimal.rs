//! Fixed-point decimals as stored by the engine: an exact scaled integer plus
//! the declared width and scale.

use std::fmt;

use eyre::Result;

use crate::error::CodecError;

/// Largest width the engine accepts for DECIMAL.
pub const MAX_DECIMAL_WIDTH: u8 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal {
    value: i128,
    width: u8,
    scale: u8,
}

impl Decimal {
    pub fn new(value: i128, width: u8, scale: u8) -> Result<Self> {
        if width == 0 || width > MAX_DECIMAL_WIDTH || scale > width {
            return Err(CodecError::malformed(format!(
                "DECIMAL({},{}) is not a valid decimal type",
                width, scale
            ))
            .into());
        }
        Ok(Self {
            value,
            width,
            scale,
        })
    }

    /// Raw scaled integer.
    pub fn value(&self) -> i128 {
        self.value
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    pub fn to_f64(&self) -> f64 {
        match i64::try_from(self.value) {
            Ok(small) if small.unsigned_abs() < (1u64 << 53) => {
                small as f64 / 10f64.powi(self.scale as i32)
            }
            _ => {
                let divisor = 10i128.pow(self.scale as u32);
                let whole = self.value / divisor;
                let fraction = self.value % divisor;
                whole as f64 + fraction as f64 / divisor as f64
            }
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.value);
        }
        let divisor = 10u128.pow(self.scale as u32);
        let magnitude = self.value.unsigned_abs();
        let sign = if self.value < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            magnitude / divisor,
            magnitude % divisor,
            width = self.scale as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_declared_scale() {
        assert_eq!(Decimal::new(12345, 18, 3).unwrap().to_string(), "12.345");
        assert_eq!(Decimal::new(-5, 4, 2).unwrap().to_string(), "-0.05");
        assert_eq!(Decimal::new(7, 9, 0).unwrap().to_string(), "7");
    }

    #[test]
    fn to_f64_divides_by_scale() {
        assert_eq!(Decimal::new(12345, 18, 3).unwrap().to_f64(), 12.345);
        assert_eq!(Decimal::new(-250, 9, 2).unwrap().to_f64(), -2.5);
    }

    #[test]
    fn to_f64_handles_hugeint_backed_values() {
        let value = 12_345_678_901_234_567_890_123i128;
        let decimal = Decimal::new(value, 38, 10).unwrap();
        let expected = 1_234_567_890_123.456_789_012_3f64;
        assert!((decimal.to_f64() - expected).abs() < 1e-3);
    }

    #[test]
    fn rejects_scale_wider_than_width() {
        assert!(Decimal::new(1, 4, 5).is_err());
        assert!(Decimal::new(1, 39, 0).is_err());
    }
}

//! # Wide-Integer Codec
//!
//! Assembles and splits 128-bit integers carried as two 64-bit halves, the
//! variable-width VARINT payload, and the UUID mapping built on top of the
//! unsigned form.
//!
//! ```text
//! hugeint  = upper(i64) * 2^64 + lower(u64)
//! uhugeint = upper(u64) * 2^64 + lower(u64)
//! uuid     = uhugeint with the top bit of `upper` flipped back
//! ```
//!
//! Results that fit `i64` are built natively and never touch the numeric
//! backend. Anything wider goes through the backend, and a missing backend
//! is reported as `BigNumbersUnavailable` before any arithmetic starts.
//!
//! ## UUID bias
//!
//! The engine stores a UUID as a signed hugeint with the most significant bit
//! flipped, so that signed comparison orders UUIDs like their unsigned value.
//! Decoding a column slot flips that bit back. The integer form exposed by
//! [`uuid_to_integer`] and accepted by [`uuid_from_integer`] is the plain
//! unsigned 128-bit value of the UUID.

use eyre::Result;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::error::CodecError;
use crate::numeric::{self, NumericBackend, TWO_POW_64};
use crate::types::WideInteger;

const UUID_BIAS_BIT: u64 = 1 << 63;
const VARINT_HEADER_SIZE: usize = 3;

/// `upper * 2^64 + lower` for a signed hugeint.
pub fn decode_hugeint(
    lower: u64,
    upper: i64,
    backend: Option<&dyn NumericBackend>,
) -> Result<WideInteger> {
    let fits_native = (upper == 0 && lower <= i64::MAX as u64)
        || (upper == -1 && lower > i64::MAX as u64);
    if fits_native {
        return Ok(WideInteger::Native(lower as i64));
    }
    let backend = numeric::require(backend, "HUGEINT decode")?;
    combine_halves(backend, &upper.to_string(), lower)
}

/// `upper * 2^64 + lower` with both halves unsigned.
pub fn decode_uhugeint(
    lower: u64,
    upper: u64,
    backend: Option<&dyn NumericBackend>,
) -> Result<WideInteger> {
    if upper == 0 && lower <= i64::MAX as u64 {
        return Ok(WideInteger::Native(lower as i64));
    }
    let backend = numeric::require(backend, "UHUGEINT decode")?;
    combine_halves(backend, &upper.to_string(), lower)
}

fn combine_halves(backend: &dyn NumericBackend, upper: &str, lower: u64) -> Result<WideInteger> {
    let shifted = backend.mul(upper, TWO_POW_64)?;
    let sum = backend.add(&shifted, &lower.to_string())?;
    WideInteger::from_decimal(&sum)
}

/// Splits `value` into `(lower, upper)` with `upper = floor(value / 2^64)`.
pub fn encode_hugeint(
    value: &WideInteger,
    backend: Option<&dyn NumericBackend>,
) -> Result<(u64, i64)> {
    match value.normalized()? {
        WideInteger::Native(v) => Ok((v as u64, if v < 0 { -1 } else { 0 })),
        WideInteger::Big(decimal) => {
            let (upper, lower) = split_halves(&decimal, backend, "HUGEINT encode")?;
            let upper = upper
                .parse::<i64>()
                .map_err(|_| CodecError::out_of_range("HUGEINT", &decimal))?;
            Ok((lower, upper))
        }
    }
}

pub fn encode_uhugeint(
    value: &WideInteger,
    backend: Option<&dyn NumericBackend>,
) -> Result<(u64, u64)> {
    match value.normalized()? {
        WideInteger::Native(v) if v >= 0 => Ok((v as u64, 0)),
        WideInteger::Native(v) => Err(CodecError::out_of_range("UHUGEINT", v).into()),
        WideInteger::Big(decimal) => {
            let (upper, lower) = split_halves(&decimal, backend, "UHUGEINT encode")?;
            let upper = upper
                .parse::<u64>()
                .map_err(|_| CodecError::out_of_range("UHUGEINT", &decimal))?;
            Ok((lower, upper))
        }
    }
}

fn split_halves(
    decimal: &str,
    backend: Option<&dyn NumericBackend>,
    operation: &str,
) -> Result<(String, u64)> {
    let backend = numeric::require(backend, operation)?;
    let (upper, lower) = backend.divmod(decimal, TWO_POW_64)?;
    let lower = lower
        .parse::<u64>()
        .map_err(|_| CodecError::malformed(format!("divmod remainder {} exceeds 64 bits", lower)))?;
    Ok((upper, lower))
}

/// Decodes a UUID column slot.
pub fn decode_uuid(lower: u64, upper: i64) -> Uuid {
    Uuid::from_u64_pair((upper as u64) ^ UUID_BIAS_BIT, lower)
}

/// Unsigned halves `(lower, upper)` of `uuid`, as handed to the engine's UUID
/// constructor.
pub fn encode_uuid(uuid: &Uuid) -> (u64, u64) {
    let (upper, lower) = uuid.as_u64_pair();
    (lower, upper)
}

/// Signed slot halves the engine stores for `uuid`.
pub fn uuid_slot_halves(uuid: &Uuid) -> (u64, i64) {
    let (lower, upper) = encode_uuid(uuid);
    (lower, (upper ^ UUID_BIAS_BIT) as i64)
}

pub fn uuid_to_integer(uuid: &Uuid, backend: Option<&dyn NumericBackend>) -> Result<WideInteger> {
    let (lower, upper) = encode_uuid(uuid);
    decode_uhugeint(lower, upper, backend)
}

pub fn uuid_from_integer(
    value: &WideInteger,
    backend: Option<&dyn NumericBackend>,
) -> Result<Uuid> {
    let (lower, upper) = encode_uhugeint(value, backend)?;
    Ok(Uuid::from_u64_pair(upper, lower))
}

/// Reconstructs a 128-bit value natively. Used for DECIMAL storage, whose
/// width never exceeds 38 digits.
pub fn hugeint_to_i128(lower: u64, upper: i64) -> i128 {
    ((upper as i128) << 64) | lower as i128
}

pub fn i128_to_hugeint(value: i128) -> (u64, i64) {
    (value as u64, (value >> 64) as i64)
}

/// Decodes a VARINT blob: 3-byte header, then big-endian magnitude bytes.
///
/// The top bit of the first header byte is set for non-negative values.
/// Negative values store every payload byte bit-inverted.
pub fn decode_varint(bytes: &[u8], backend: Option<&dyn NumericBackend>) -> Result<WideInteger> {
    if bytes.len() <= VARINT_HEADER_SIZE {
        return Err(CodecError::malformed(format!(
            "VARINT of {} bytes has no payload",
            bytes.len()
        ))
        .into());
    }
    let negative = bytes[0] & 0x80 == 0;
    let payload = bytes[VARINT_HEADER_SIZE..].iter().map(|b| if negative { !b } else { *b });

    let significant: SmallVec<[u8; 16]> = payload.skip_while(|b| *b == 0).collect();
    if significant.len() <= 8 {
        let magnitude = significant.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        let native = if negative {
            0i64.checked_sub_unsigned(magnitude)
        } else {
            i64::try_from(magnitude).ok()
        };
        if let Some(native) = native {
            return Ok(WideInteger::Native(native));
        }
    }

    let backend = numeric::require(backend, "VARINT decode")?;
    let mut decimal = String::from("0");
    for byte in significant {
        decimal = backend.add(&backend.mul(&decimal, "256")?, &byte.to_string())?;
    }
    if negative {
        decimal = backend.sub("0", &decimal)?;
    }
    WideInteger::from_decimal(&decimal)
}

/// Builds the VARINT blob for `value`.
pub fn encode_varint(value: &WideInteger, backend: Option<&dyn NumericBackend>) -> Result<Vec<u8>> {
    let value = value.normalized()?;
    let negative = value.is_negative();
    let mut magnitude_be: Vec<u8> = match &value {
        WideInteger::Native(v) => {
            let bytes = v.unsigned_abs().to_be_bytes();
            let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
            bytes[first..].to_vec()
        }
        WideInteger::Big(decimal) => {
            let backend = numeric::require(backend, "VARINT encode")?;
            let mut rest = decimal.trim_start_matches('-').to_string();
            let mut little = Vec::new();
            while rest != "0" {
                let (quotient, byte) = backend.divmod(&rest, "256")?;
                little.push(byte.parse::<u8>().map_err(|_| {
                    CodecError::malformed(format!("divmod remainder {} exceeds a byte", byte))
                })?);
                rest = quotient;
            }
            little.reverse();
            little
        }
    };

    let size = magnitude_be.len() as u32;
    let mut header = [
        ((size >> 16) as u8 & 0x7F) | 0x80,
        (size >> 8) as u8,
        size as u8,
    ];
    if negative {
        for byte in header.iter_mut().chain(magnitude_be.iter_mut()) {
            *byte = !*byte;
        }
    }
    let mut out = header.to_vec();
    out.extend_from_slice(&magnitude_be);
    Ok(out)
}

/// Renders a BIT blob: first byte is the number of padding bits at the front
/// of the bit string.
pub fn decode_bit(bytes: &[u8]) -> Result<String> {
    let (&padding, data) = bytes
        .split_first()
        .ok_or_else(|| CodecError::malformed("BIT value without padding byte"))?;
    if padding >= 8 || (data.is_empty() && padding > 0) {
        return Err(CodecError::malformed(format!("BIT padding {} is invalid", padding)).into());
    }
    let mut bits = String::with_capacity(data.len() * 8);
    for byte in data {
        bits.push_str(&format!("{:08b}", byte));
    }
    Ok(bits.split_off(padding as usize))
}

/// Builds the BIT blob for a string of '0'/'1' characters.
pub fn encode_bit(bits: &str) -> Result<Vec<u8>> {
    if !bits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(CodecError::malformed(format!("'{}' is not a bit string", bits)).into());
    }
    let padding = (8 - bits.len() % 8) % 8;
    let padded: String = "1".repeat(padding) + bits;
    let mut out = vec![padding as u8];
    for chunk in padded.as_bytes().chunks(8) {
        let byte = chunk.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0'));
        out.push(byte);
    }
    Ok(out)
}

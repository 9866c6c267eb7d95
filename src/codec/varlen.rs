//! # Variable-Length Codec
//!
//! VARCHAR, BLOB, BIT and VARINT cells share the 16-byte string descriptor
//! (see [`crate::abi::StringDescriptor`]). Payloads of up to 12 bytes live
//! inside the descriptor; longer ones are resolved through the vector's
//! string heap using the descriptor's pointer.

use eyre::Result;

use crate::abi::StringDescriptor;
use crate::config::{STRING_INLINE_LIMIT, STRING_PREFIX_SIZE};
use crate::engine::NativeVector;
use crate::error::CodecError;

/// Raw payload bytes of the string cell at `row`.
pub fn read_varlen(vector: &dyn NativeVector, row: usize) -> Result<&[u8]> {
    let descriptor = StringDescriptor::at(vector.data(), row)?;
    if descriptor.is_inlined() {
        return Ok(descriptor.inline_bytes());
    }
    let len = descriptor.length() as usize;
    let bytes = vector.string_heap(descriptor.pointer(), len).ok_or_else(|| {
        CodecError::malformed(format!(
            "string of {} bytes at row {} points to unknown address {:#x}",
            len,
            row,
            descriptor.pointer()
        ))
    })?;
    if bytes.len() != len || bytes[..STRING_PREFIX_SIZE] != descriptor.prefix() {
        return Err(CodecError::malformed(format!(
            "string heap entry at {:#x} does not match its descriptor",
            descriptor.pointer()
        ))
        .into());
    }
    Ok(bytes)
}

pub fn decode_varchar(vector: &dyn NativeVector, row: usize) -> Result<String> {
    let bytes = read_varlen(vector, row)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CodecError::malformed(format!("VARCHAR at row {} is not UTF-8: {}", row, e)).into())
}

/// Builds the descriptor for `bytes`, inlined when short enough, else
/// referencing `pointer`.
pub fn describe(bytes: &[u8], pointer: u64) -> Result<StringDescriptor> {
    if bytes.len() <= STRING_INLINE_LIMIT {
        return Ok(StringDescriptor::inlined(bytes));
    }
    let length = u32::try_from(bytes.len())
        .map_err(|_| CodecError::out_of_range("string length", bytes.len()))?;
    let mut prefix = [0u8; STRING_PREFIX_SIZE];
    prefix.copy_from_slice(&bytes[..STRING_PREFIX_SIZE]);
    Ok(StringDescriptor::pointed(length, prefix, pointer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::ColumnBuilder;
    use crate::engine::NativeValue;
    use crate::types::LogicalType;

    fn column(strings: &[&str]) -> crate::engine::memory::ColumnBuffer {
        let mut builder = ColumnBuilder::new(LogicalType::Varchar);
        for s in strings {
            builder.push(&NativeValue::Varchar(s.to_string())).unwrap();
        }
        builder.finish()
    }

    #[test]
    fn inline_and_pointer_strings_split_at_twelve_bytes() {
        let eleven = "abcdefghijk";
        let twelve = "abcdefghijkl";
        let thirteen = "abcdefghijklm";
        let buffer = column(&[eleven, twelve, thirteen]);

        for (row, expected) in [eleven, twelve, thirteen].iter().enumerate() {
            let descriptor = StringDescriptor::at(buffer.data(), row).unwrap();
            assert_eq!(descriptor.is_inlined(), expected.len() <= 12);
            assert_eq!(decode_varchar(&buffer, row).unwrap(), *expected);
        }
    }

    #[test]
    fn empty_string_is_inlined() {
        let buffer = column(&[""]);
        assert_eq!(read_varlen(&buffer, 0).unwrap(), b"");
    }

    #[test]
    fn describe_keeps_prefix_of_long_payloads() {
        let descriptor = describe(b"hello, world!", 0xdead_beef).unwrap();
        assert!(!descriptor.is_inlined());
        assert_eq!(&descriptor.prefix(), b"hell");
        assert_eq!(descriptor.pointer(), 0xdead_beef);
        assert_eq!(descriptor.length(), 13);
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let mut builder = ColumnBuilder::new(LogicalType::Varchar);
        builder.push_bytes(&[0xff, 0xfe]).unwrap();
        let buffer = builder.finish();
        let err = decode_varchar(&buffer, 0).unwrap_err();
        assert!(matches!(
            crate::error::codec_error(&err),
            Some(CodecError::MalformedNativeValue { .. })
        ));
    }
}

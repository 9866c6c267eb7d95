//! Binary values and their escaped text form.
//!
//! Display renders printable ASCII (`0x20..=0x7E`) as-is and every other byte
//! as `\xNN` with upper-case hex digits. It leaves `\` alone, so a blob holding
//! the text `\x41` displays the same as one holding `A`.
//!
//! [`Blob::to_escaped`] also escapes `\` as `\x5C`, and [`Blob::from_escaped`]
//! is its exact inverse.

use std::fmt;

use eyre::Result;

use crate::error::CodecError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Blob(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Escaped text form that [`Blob::from_escaped`] reads back unchanged.
    pub fn to_escaped(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for &byte in &self.0 {
            if byte != b'\\' && (0x20..=0x7E).contains(&byte) {
                out.push(byte as char);
            } else {
                out.push_str("\\x");
                out.push_str(&hex::encode_upper([byte]));
            }
        }
        out
    }

    /// Parses the text produced by [`Blob::to_escaped`].
    pub fn from_escaped(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
                let digits = bytes
                    .get(i + 2..i + 4)
                    .ok_or_else(|| CodecError::malformed("truncated \\x escape in blob text"))?;
                let decoded = hex::decode(digits).map_err(|e| {
                    CodecError::malformed(format!("invalid \\x escape in blob text: {}", e))
                })?;
                out.extend_from_slice(&decoded);
                i += 4;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        Ok(Blob(out))
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Blob(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Blob(bytes.to_vec())
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            if (0x20..=0x7E).contains(&byte) {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{}", hex::encode_upper([byte]))?;
            }
        }
        Ok(())
    }
}

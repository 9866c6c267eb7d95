//! Codec error types.
//!
//! Every fallible operation in this crate returns `eyre::Result`. Failures
//! that callers may want to react to are raised as a [`CodecError`] inside the
//! report, so they can be recovered with [`codec_error`]:
//!
//! ```ignore
//! match session.query("SELECT huge FROM t")?.rows().next() {
//!     Some(Err(report)) => match codec_error(&report) {
//!         Some(CodecError::BigNumbersUnavailable { .. }) => { /* enable backend */ }
//!         _ => return Err(report),
//!     },
//!     _ => {}
//! }
//! ```

use thiserror::Error;

/// Typed failures raised by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A value or declared type has no decoder/encoder mapping.
    #[error("Unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    /// A value needs arbitrary-precision arithmetic but no backend is installed.
    #[error("{operation} needs integers wider than 64 bits, but no numeric backend is available")]
    BigNumbersUnavailable { operation: String },

    /// Contradictory or out-of-calendar temporal input.
    #[error("Invalid temporal value: {reason}")]
    InvalidTemporalValue { reason: String },

    /// The engine handed back a type tag or layout the codec does not expect.
    #[error("Malformed native value: {reason}")]
    MalformedNativeValue { reason: String },

    /// A native resource was used after it was released.
    #[error("Resource lifecycle violation: {reason}")]
    ResourceLifecycle { reason: String },

    /// A value does not fit the requested wire type.
    #[error("Value {value} is out of range for {target}")]
    OutOfRange { target: String, value: String },

    /// The engine reported an error string.
    #[error("{operation} failed: {message}")]
    Engine { operation: String, message: String },
}

impl CodecError {
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    pub fn big_numbers(operation: impl Into<String>) -> Self {
        Self::BigNumbersUnavailable {
            operation: operation.into(),
        }
    }

    pub fn temporal(reason: impl Into<String>) -> Self {
        Self::InvalidTemporalValue {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedNativeValue {
            reason: reason.into(),
        }
    }

    pub fn lifecycle(reason: impl Into<String>) -> Self {
        Self::ResourceLifecycle {
            reason: reason.into(),
        }
    }

    pub fn out_of_range(target: impl Into<String>, value: impl ToString) -> Self {
        Self::OutOfRange {
            target: target.into(),
            value: value.to_string(),
        }
    }

    pub fn engine(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Returns the typed codec failure carried by `report`, if any.
pub fn codec_error(report: &eyre::Report) -> Option<&CodecError> {
    report.downcast_ref::<CodecError>()
}

//! # Runtime Codec Options
//!
//! `CodecConfig` is created once and shared read-only (behind an `Arc`) by
//! every result set, prepared statement and appender created from a session.
//!
//! | Option          | Default                          | Description                               |
//! |-----------------|----------------------------------|-------------------------------------------|
//! | numeric_backend | `numeric::default_backend()`     | Arbitrary-precision arithmetic provider   |
//! | calendar_limits | 14 digits / 9_999_999_999_999    | Chunking of large epoch offsets           |
//!
//! ## Usage
//!
//! ```ignore
//! let config = CodecConfig::builder()
//!     .without_numeric_backend()
//!     .calendar_limits(CalendarLimits::new(10, 999_999_999)?)
//!     .build();
//! ```

use std::fmt;
use std::sync::Arc;

use eyre::{ensure, Result};

use crate::config::constants::{DEFAULT_CALENDAR_DIGIT_LIMIT, DEFAULT_CALENDAR_STEP};
use crate::numeric::{self, NumericBackend};

/// Thresholds for applying large offsets to the epoch in bounded steps.
///
/// An offset whose absolute value has at least `digit_limit` decimal digits
/// is applied as `offset / step` additions of `step` units followed by one
/// addition of the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarLimits {
    digit_limit: u32,
    step: i64,
}

impl CalendarLimits {
    pub fn new(digit_limit: u32, step: i64) -> Result<Self> {
        ensure!(digit_limit > 0, "calendar digit limit must be positive");
        ensure!(step > 0, "calendar step must be positive, got {}", step);
        ensure!(
            decimal_digits(step.unsigned_abs()) < digit_limit,
            "calendar step {} must have fewer than {} digits",
            step,
            digit_limit
        );
        Ok(Self { digit_limit, step })
    }

    pub fn digit_limit(&self) -> u32 {
        self.digit_limit
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Returns true when `offset` must be applied in steps.
    pub fn needs_chunking(&self, offset: i64) -> bool {
        decimal_digits(offset.unsigned_abs()) >= self.digit_limit
    }
}

impl Default for CalendarLimits {
    fn default() -> Self {
        Self {
            digit_limit: DEFAULT_CALENDAR_DIGIT_LIMIT,
            step: DEFAULT_CALENDAR_STEP,
        }
    }
}

fn decimal_digits<T: Into<u128>>(value: T) -> u32 {
    let value: u128 = value.into();
    if value == 0 {
        1
    } else {
        value.ilog10() + 1
    }
}

/// Shared decoding and encoding options.
#[derive(Clone)]
pub struct CodecConfig {
    numeric_backend: Option<Arc<dyn NumericBackend>>,
    calendar_limits: CalendarLimits,
}

impl CodecConfig {
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::new()
    }

    pub fn numeric_backend(&self) -> Option<&dyn NumericBackend> {
        self.numeric_backend.as_deref()
    }

    pub fn calendar_limits(&self) -> CalendarLimits {
        self.calendar_limits
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfigBuilder::new().build()
    }
}

impl fmt::Debug for CodecConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecConfig")
            .field(
                "numeric_backend",
                &self.numeric_backend.as_ref().map(|b| b.name()),
            )
            .field("calendar_limits", &self.calendar_limits)
            .finish()
    }
}

/// Builder for [`CodecConfig`].
pub struct CodecConfigBuilder {
    numeric_backend: Option<Option<Arc<dyn NumericBackend>>>,
    calendar_limits: Option<CalendarLimits>,
}

impl Default for CodecConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecConfigBuilder {
    pub fn new() -> Self {
        Self {
            numeric_backend: None,
            calendar_limits: None,
        }
    }

    /// Uses the given backend for arithmetic beyond the 64-bit range.
    pub fn numeric_backend(mut self, backend: Arc<dyn NumericBackend>) -> Self {
        self.numeric_backend = Some(Some(backend));
        self
    }

    /// Disables arbitrary-precision arithmetic. Values that need it fail with
    /// `CodecError::BigNumbersUnavailable`.
    pub fn without_numeric_backend(mut self) -> Self {
        self.numeric_backend = Some(None);
        self
    }

    pub fn calendar_limits(mut self, limits: CalendarLimits) -> Self {
        self.calendar_limits = Some(limits);
        self
    }

    pub fn build(self) -> CodecConfig {
        let numeric_backend = match self.numeric_backend {
            Some(explicit) => explicit,
            None => numeric::default_backend(),
        };

        tracing::debug!(
            backend = numeric_backend.as_ref().map(|b| b.name()).unwrap_or("none"),
            "resolved numeric backend"
        );

        CodecConfig {
            numeric_backend,
            calendar_limits: self.calendar_limits.unwrap_or_default(),
        }
    }
}

//! # Codec Configuration Module
//!
//! This module holds both the fixed constants of the engine's in-memory ABI
//! and the small set of runtime options that change how values are decoded.
//!
//! Layout constants that depend on each other live together in [`constants`]
//! and are enforced through compile-time assertions. Runtime options live in
//! [`options`] and are assembled with [`CodecConfig::builder`].
//!
//! ## Module Organization
//!
//! - [`constants`]: wire-format sizes, sentinels and calendar defaults
//! - [`options`]: `CodecConfig`, its builder and `CalendarLimits`

pub mod constants;
pub mod options;

pub use constants::*;
pub use options::{CalendarLimits, CodecConfig, CodecConfigBuilder};

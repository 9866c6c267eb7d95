//! # In-Memory Engine
//!
//! A small engine that produces result chunks in the exact native layout:
//! tables fed through appenders, `SELECT * FROM <table>` scans, canned
//! results registered per SQL string, and prepared statements that echo
//! their bound parameters.
//!
//! It backs the crate's tests and benchmarks, and serves as the
//! reference for what a real engine binding has to provide.
//!
//! ```text
//! ColumnBuilder ──finish──> ColumnBuffer ──┐
//!                                          ├──> MemoryResult ──fetch_chunk──> MemoryChunk
//! appender rows ──> Table ──scan (chunked)─┘
//! ```
//!
//! [`ResourceTracker`] counts chunks and results that are alive, so callers
//! can check that nothing accumulates during iteration.

mod column;
mod engine;

pub use column::{ColumnBuffer, ColumnBuilder, StringHeap, NULL_POISON};
pub use engine::{MemoryChunk, MemoryEngine, MemoryResult, ResourceTracker};
